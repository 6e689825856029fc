use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::booking::ServiceType;

/// Availability row as the backend stores it. `is_available` flips to
/// false once a customer books the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    pub id: i64,
    pub partner_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

/// Availability row with the partner profile embedded, as the
/// platform-wide listing returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerSlot {
    pub id: i64,
    pub partner_id: Option<i64>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub created_at: Option<String>,
    pub partner: Option<SlotPartner>,
}

/// Partner block inside a platform-wide availability row. Slimmer than a
/// directory `Partner`; the listing omits contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPartner {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub service_type: ServiceType,
    pub country: Option<String>,
    pub cities: Option<Vec<String>>,
}

/// One cached hour slot, keyed by calendar date and start time. This is
/// the form the editor plans against and the views render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub end_time: String,
    pub is_booked: bool,
}

impl AvailabilitySlot {
    /// Splits a backend row into the date/time tuple form. Rows with
    /// unparseable datetimes yield None and are dropped by the caller.
    pub fn from_record(record: &SlotRecord) -> Option<AvailabilitySlot> {
        let time = extract_time(&record.start_time)?;
        let end_time = extract_time(&record.end_time)?;
        Some(AvailabilitySlot {
            id: record.id,
            date: extract_date(&record.start_time).to_string(),
            time: time.to_string(),
            end_time: end_time.to_string(),
            is_booked: !record.is_available,
        })
    }
}

/// Orders slots for display: by date, then start time within the day.
pub fn sort_slots(slots: &mut [AvailabilitySlot]) {
    slots.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

pub fn combine_date_time(date: &str, time: &str) -> String {
    format!("{date}T{time}:00")
}

pub fn extract_date(datetime: &str) -> &str {
    datetime.split('T').next().unwrap_or(datetime)
}

pub fn extract_time(datetime: &str) -> Option<&str> {
    datetime.split('T').nth(1)?.get(..5)
}

/// Start/end datetimes for a one-hour slot beginning at `hour` on `date`.
/// An end hour that wraps past midnight lands on the next calendar day.
pub fn hour_slot_times(date: NaiveDate, hour: u32) -> (String, String) {
    let start = format!("{date}T{hour:02}:00:00");
    let end_hour = (hour + 1) % 24;
    let end_date = if end_hour == 0 {
        date + Duration::days(1)
    } else {
        date
    };
    let end = format!("{end_date}T{end_hour:02}:00:00");
    (start, end)
}

/// Expands an inclusive date range into the individual days.
pub fn expand_dates(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = from;
    while current <= to {
        dates.push(current);
        current += Duration::days(1);
    }
    dates
}

/// 12-hour label for an hour of day, matching the slot picker ("14:00"
/// renders as "2:00 PM", "00:00" as "12:00 AM").
pub fn hour_label(hour: u32) -> String {
    let hour12 = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    let ampm = if hour < 12 { "AM" } else { "PM" };
    format!("{hour12}:00 {ampm}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_combine_and_extract() {
        let dt = combine_date_time("2025-06-10", "14:00");
        assert_eq!(dt, "2025-06-10T14:00:00");
        assert_eq!(extract_date(&dt), "2025-06-10");
        assert_eq!(extract_time(&dt), Some("14:00"));
    }

    #[test]
    fn test_extract_time_malformed() {
        assert_eq!(extract_time("2025-06-10"), None);
        assert_eq!(extract_time("2025-06-10T9"), None);
    }

    #[test]
    fn test_hour_slot_times() {
        let (start, end) = hour_slot_times(date("2025-06-10"), 14);
        assert_eq!(start, "2025-06-10T14:00:00");
        assert_eq!(end, "2025-06-10T15:00:00");
    }

    #[test]
    fn test_hour_slot_times_midnight_rollover() {
        let (start, end) = hour_slot_times(date("2025-06-10"), 23);
        assert_eq!(start, "2025-06-10T23:00:00");
        assert_eq!(end, "2025-06-11T00:00:00");
    }

    #[test]
    fn test_rollover_crosses_month_boundary() {
        let (_, end) = hour_slot_times(date("2025-06-30"), 23);
        assert_eq!(end, "2025-07-01T00:00:00");
    }

    #[test]
    fn test_expand_dates_inclusive() {
        let days = expand_dates(date("2025-06-28"), date("2025-07-01"));
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date("2025-06-28"));
        assert_eq!(days[3], date("2025-07-01"));
    }

    #[test]
    fn test_expand_dates_single_day() {
        assert_eq!(expand_dates(date("2025-06-10"), date("2025-06-10")).len(), 1);
    }

    #[test]
    fn test_from_record_flips_availability_flag() {
        let record = SlotRecord {
            id: 5,
            partner_id: Some(2),
            start_time: "2025-06-10T09:00:00".to_string(),
            end_time: "2025-06-10T10:00:00".to_string(),
            is_available: false,
        };
        let slot = AvailabilitySlot::from_record(&record).unwrap();
        assert_eq!(slot.date, "2025-06-10");
        assert_eq!(slot.time, "09:00");
        assert_eq!(slot.end_time, "10:00");
        assert!(slot.is_booked);
    }

    #[test]
    fn test_from_record_rejects_malformed_times() {
        let record = SlotRecord {
            id: 5,
            partner_id: None,
            start_time: "not-a-datetime".to_string(),
            end_time: "2025-06-10T10:00:00".to_string(),
            is_available: true,
        };
        assert!(AvailabilitySlot::from_record(&record).is_none());
    }

    #[test]
    fn test_sort_slots_by_date_then_time() {
        let mut slots = vec![
            AvailabilitySlot {
                id: 1,
                date: "2025-06-11".to_string(),
                time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                is_booked: false,
            },
            AvailabilitySlot {
                id: 2,
                date: "2025-06-10".to_string(),
                time: "15:00".to_string(),
                end_time: "16:00".to_string(),
                is_booked: false,
            },
            AvailabilitySlot {
                id: 3,
                date: "2025-06-10".to_string(),
                time: "09:00".to_string(),
                end_time: "10:00".to_string(),
                is_booked: false,
            },
        ];
        sort_slots(&mut slots);
        assert_eq!(
            slots.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12:00 AM");
        assert_eq!(hour_label(9), "9:00 AM");
        assert_eq!(hour_label(12), "12:00 PM");
        assert_eq!(hour_label(14), "2:00 PM");
        assert_eq!(hour_label(23), "11:00 PM");
    }
}
