use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::booking::ServiceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Customer,
    Partner,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Partner => "partner",
            UserType::Admin => "admin",
        }
    }
}

/// Customer account as listed by the backend directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Partner account with its service profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub service_type: ServiceType,
    pub country: Option<String>,
    pub cities: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
}

/// The `user` object inside the backend's login payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl AccountInfo {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Backend response to `POST /auth/login`. The token field is snake_case
/// on the wire while the rest is camelCase.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: AccountInfo,
    #[serde(rename = "userType")]
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentBooking {
    pub id: i64,
    pub customer_name: Option<String>,
    pub partner_name: Option<String>,
    pub service_type: Option<String>,
    pub status: Option<String>,
    pub booking_date: Option<String>,
    pub created_at: Option<String>,
}

/// Platform aggregates from `GET /stats`. Every field defaults so a sparse
/// backend payload still renders a dashboard of zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_partners: i64,
    pub total_bookings: i64,
    pub total_availabilities: i64,
    pub recent_bookings: Vec<RecentBooking>,
    pub active_partners_by_service: HashMap<String, i64>,
    pub bookings_by_status: HashMap<String, i64>,
}

/// Maps the country name stored on customer profiles to the lowercase
/// ISO code the booking-request endpoint expects. Unknown names map to
/// an empty string, which the backend treats as "no country filter".
pub fn country_code(country: &str) -> &'static str {
    match country.to_uppercase().as_str() {
        "AUSTRALIA" => "au",
        "UNITED KINGDOM" => "gb",
        "UNITED STATES" => "us",
        "CANADA" => "ca",
        "AUSTRIA" => "at",
        "GERMANY" => "de",
        "FRANCE" => "fr",
        _ => "",
    }
}
