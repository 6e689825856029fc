use serde::{Deserialize, Serialize};

use crate::models::user::{Customer, Partner};

/// Booking record as the marketplace backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub service_type: Option<ServiceType>,
    pub start_time: String,
    pub end_time: String,
    pub status: BookingStatus,
    pub booking_date: Option<String>,
    pub description: Option<String>,
    pub total_amount: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
    pub customer: Option<Customer>,
    pub partner: Option<Partner>,
}

impl Booking {
    /// Service type for display, preferring the partner's profile over the
    /// booking's own field (the backend fills whichever it has).
    pub fn display_service_type(&self) -> Option<&ServiceType> {
        self.partner
            .as_ref()
            .map(|p| &p.service_type)
            .or(self.service_type.as_ref())
    }
}

/// Status values the backend is known to emit. Anything else lands in
/// `Unknown` and renders with a fallback badge instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Requested,
    InProgress,
    CancelledFailure,
    CancelledRejected,
    Unknown(String),
}

impl BookingStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            "requested" => BookingStatus::Requested,
            "in_progress" => BookingStatus::InProgress,
            "cancelled_failure" => BookingStatus::CancelledFailure,
            "cancelled_rejected" => BookingStatus::CancelledRejected,
            other => BookingStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Requested => "requested",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::CancelledFailure => "cancelled_failure",
            BookingStatus::CancelledRejected => "cancelled_rejected",
            BookingStatus::Unknown(s) => s,
        }
    }

    pub fn badge(&self) -> StatusBadge {
        let (label, severity) = match self {
            BookingStatus::Pending => ("Pending", Severity::Neutral),
            BookingStatus::Confirmed => ("Confirmed", Severity::Positive),
            BookingStatus::Cancelled => ("Cancelled", Severity::Negative),
            BookingStatus::Completed => ("Completed", Severity::Muted),
            BookingStatus::Requested => ("Requested", Severity::Neutral),
            BookingStatus::InProgress => ("In Progress", Severity::Positive),
            BookingStatus::CancelledFailure => ("Cancelled", Severity::Negative),
            BookingStatus::CancelledRejected => ("Rejected", Severity::Negative),
            BookingStatus::Unknown(raw) => {
                return StatusBadge {
                    label: raw.clone(),
                    severity: Severity::Neutral,
                }
            }
        };
        StatusBadge {
            label: label.to_string(),
            severity,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        BookingStatus::parse(&s)
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> String {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusBadge {
    pub label: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Neutral,
    Positive,
    Negative,
    Muted,
}

/// Trades offered on the platform. `Other` covers service types added on
/// the backend before this client learns about them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Painter,
    Electrician,
    Plumber,
    Cleaner,
    Handyman,
    Hvac,
    Landscaper,
    Roofer,
    Other(String),
}

impl ServiceType {
    pub const ALL: [ServiceType; 8] = [
        ServiceType::Painter,
        ServiceType::Electrician,
        ServiceType::Plumber,
        ServiceType::Cleaner,
        ServiceType::Handyman,
        ServiceType::Hvac,
        ServiceType::Landscaper,
        ServiceType::Roofer,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "painter" => ServiceType::Painter,
            "electrician" => ServiceType::Electrician,
            "plumber" => ServiceType::Plumber,
            "cleaner" => ServiceType::Cleaner,
            "handyman" => ServiceType::Handyman,
            "hvac" => ServiceType::Hvac,
            "landscaper" => ServiceType::Landscaper,
            "roofer" => ServiceType::Roofer,
            other => ServiceType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceType::Painter => "painter",
            ServiceType::Electrician => "electrician",
            ServiceType::Plumber => "plumber",
            ServiceType::Cleaner => "cleaner",
            ServiceType::Handyman => "handyman",
            ServiceType::Hvac => "hvac",
            ServiceType::Landscaper => "landscaper",
            ServiceType::Roofer => "roofer",
            ServiceType::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ServiceType::Other(_))
    }

    pub fn profile(&self) -> ServiceProfile {
        let (label, icon) = match self {
            ServiceType::Painter => ("Painter", Some("🎨")),
            ServiceType::Electrician => ("Electrician", Some("⚡")),
            ServiceType::Plumber => ("Plumber", Some("🔧")),
            ServiceType::Cleaner => ("Cleaner", Some("🧽")),
            ServiceType::Handyman => ("Handyman", Some("🔨")),
            ServiceType::Hvac => ("HVAC", Some("❄️")),
            ServiceType::Landscaper => ("Landscaper", Some("🌱")),
            ServiceType::Roofer => ("Roofer", Some("🏠")),
            ServiceType::Other(raw) => {
                return ServiceProfile {
                    label: raw.clone(),
                    icon: None,
                }
            }
        };
        ServiceProfile {
            label: label.to_string(),
            icon,
        }
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        ServiceType::parse(&s)
    }
}

impl From<ServiceType> for String {
    fn from(service: ServiceType) -> String {
        service.as_str().to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServiceProfile {
    pub label: String,
    pub icon: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            "pending",
            "confirmed",
            "cancelled",
            "completed",
            "requested",
            "in_progress",
            "cancelled_failure",
            "cancelled_rejected",
        ] {
            assert_eq!(BookingStatus::parse(s).as_str(), s);
        }
    }

    #[test]
    fn test_unknown_status_keeps_raw_value() {
        let status = BookingStatus::parse("on_hold");
        assert_eq!(status, BookingStatus::Unknown("on_hold".to_string()));
        assert_eq!(status.as_str(), "on_hold");
    }

    #[test]
    fn test_unknown_status_renders_fallback_badge() {
        let badge = BookingStatus::parse("mystery_state").badge();
        assert_eq!(badge.label, "mystery_state");
        assert_eq!(badge.severity, Severity::Neutral);
    }

    #[test]
    fn test_badge_labels_and_severities() {
        assert_eq!(BookingStatus::Confirmed.badge().label, "Confirmed");
        assert_eq!(BookingStatus::Confirmed.badge().severity, Severity::Positive);
        assert_eq!(BookingStatus::CancelledFailure.badge().label, "Cancelled");
        assert_eq!(
            BookingStatus::CancelledFailure.badge().severity,
            Severity::Negative
        );
        assert_eq!(BookingStatus::CancelledRejected.badge().label, "Rejected");
        assert_eq!(BookingStatus::Completed.badge().severity, Severity::Muted);
    }

    #[test]
    fn test_status_deserializes_from_wire_string() {
        let status: BookingStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(status, BookingStatus::InProgress);

        let status: BookingStatus = serde_json::from_str(r#""brand_new""#).unwrap();
        assert_eq!(status, BookingStatus::Unknown("brand_new".to_string()));
    }

    #[test]
    fn test_service_type_profile() {
        let profile = ServiceType::Hvac.profile();
        assert_eq!(profile.label, "HVAC");
        assert_eq!(profile.icon, Some("❄️"));

        let profile = ServiceType::parse("carpenter").profile();
        assert_eq!(profile.label, "carpenter");
        assert_eq!(profile.icon, None);
    }

    #[test]
    fn test_booking_parses_backend_payload() {
        let json = r#"{
            "id": 7,
            "customerId": 3,
            "partnerId": 9,
            "serviceType": "plumber",
            "startTime": "2025-06-10T14:00:00",
            "endTime": "2025-06-10T15:00:00",
            "status": "confirmed",
            "createdAt": "2025-06-01T09:00:00",
            "updatedAt": "2025-06-01T09:00:00"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, 7);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.service_type, Some(ServiceType::Plumber));
        assert!(booking.partner.is_none());
    }
}
