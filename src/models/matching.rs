use serde::{Deserialize, Serialize};

use crate::models::booking::BookingStatus;

/// Backend response to a booking request: the request id, its status and
/// the candidate partner slots the matcher found.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub uuid: String,
    pub status: String,
    #[serde(default)]
    pub nearest_availabilities: Vec<Candidate>,
    pub booking_object: Option<RequestBooking>,
}

impl RequestOutcome {
    /// First-level classification of the outcome. An empty candidate list
    /// means no match, whatever the status says.
    pub fn classify(&self) -> MatchKind {
        if self.nearest_availabilities.is_empty() {
            return MatchKind::NoMatch;
        }
        match self.status.as_str() {
            "confirmed" => MatchKind::Confirmed,
            _ => MatchKind::Alternatives,
        }
    }

    pub fn candidate(&self, partner_id: i64) -> Option<&Candidate> {
        self.nearest_availabilities
            .iter()
            .find(|c| c.partner_id == partner_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Exact match, ready to finalize with the offered partner.
    Confirmed,
    /// No exact match but alternative slots to pick from.
    Alternatives,
    NoMatch,
}

/// One partner slot offered by the matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub start_time: String,
    pub end_time: String,
    pub partner_id: i64,
    pub partner_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Booking row embedded in a request outcome once the backend has
/// provisionally created one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBooking {
    pub id: i64,
    pub uuid: Option<String>,
    pub customer_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub service_type: Option<String>,
    pub booking_date: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub description: Option<String>,
    pub total_amount: Option<f64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Backend response to a confirm call. The partner block keeps its legacy
/// wire name `painter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettledBooking {
    pub id: Option<i64>,
    pub uuid: Option<String>,
    pub booking_date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: Option<BookingStatus>,
    pub total_amount: Option<f64>,
    pub painter: Option<SettledPartner>,
}

impl SettledBooking {
    pub fn partner_name(&self) -> Option<&str> {
        self.painter.as_ref().and_then(|p| p.name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettledPartner {
    pub name: Option<String>,
}
