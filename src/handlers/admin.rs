use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::availability::{extract_date, extract_time, PartnerSlot};
use crate::models::booking::ServiceProfile;
use crate::models::user::{Customer, DashboardStats, Partner, UserType};
use crate::state::AppState;

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Admin)?;
    let stats = state.backend.dashboard_stats(&handle.session).await?;
    Ok(Json(stats))
}

// GET /api/admin/customers
pub async fn get_customers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Customer>>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Admin)?;
    let customers = state.backend.list_customers(&handle.session).await?;
    Ok(Json(customers))
}

// GET /api/admin/partners
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnersQuery {
    pub service_type: Option<String>,
}

pub async fn get_partners(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PartnersQuery>,
) -> Result<Json<Vec<Partner>>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Admin)?;
    let partners = state
        .backend
        .list_partners(&handle.session, query.service_type.as_deref())
        .await?;
    Ok(Json(partners))
}

// GET /api/admin/availability
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Comma-separated service types.
    pub service_type: Option<String>,
    /// Comma-separated country names.
    pub country: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSlotView {
    pub id: i64,
    pub partner_id: Option<i64>,
    pub partner_name: Option<String>,
    pub service: Option<ServiceProfile>,
    pub country: Option<String>,
    pub cities: Vec<String>,
    pub date: String,
    pub time: Option<String>,
    pub end_time: Option<String>,
    pub status: &'static str,
    pub created_at: Option<String>,
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<PlatformSlotView>>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Admin)?;

    let services = csv_filter(query.service_type.as_deref());
    let countries = csv_filter(query.country.as_deref());
    let today = Local::now().date_naive();

    let slots = state.backend.list_all_availability(&handle.session).await?;
    let views = slots
        .iter()
        .filter(|slot| {
            let partner = slot.partner.as_ref();
            let matches_service = services.is_empty()
                || partner.is_some_and(|p| {
                    services.iter().any(|s| s == p.service_type.as_str())
                });
            let matches_country = countries.is_empty()
                || partner
                    .and_then(|p| p.country.as_deref())
                    .is_some_and(|c| countries.iter().any(|want| want == c));
            matches_service && matches_country
        })
        .map(|slot| slot_view(slot, today))
        .collect();
    Ok(Json(views))
}

fn slot_view(slot: &PartnerSlot, today: NaiveDate) -> PlatformSlotView {
    let partner = slot.partner.as_ref();
    PlatformSlotView {
        id: slot.id,
        partner_id: slot.partner_id.or_else(|| partner.map(|p| p.id)),
        partner_name: partner.map(|p| format!("{} {}", p.first_name, p.last_name)),
        service: partner.map(|p| p.service_type.profile()),
        country: partner.and_then(|p| p.country.clone()),
        cities: partner.and_then(|p| p.cities.clone()).unwrap_or_default(),
        date: extract_date(&slot.start_time).to_string(),
        time: extract_time(&slot.start_time).map(str::to_string),
        end_time: extract_time(&slot.end_time).map(str::to_string),
        status: slot_status(slot, today),
        created_at: slot.created_at.clone(),
    }
}

/// Slots whose day has passed are expired whatever the booked flag says.
fn slot_status(slot: &PartnerSlot, today: NaiveDate) -> &'static str {
    let date = extract_date(&slot.start_time);
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(day) if day < today => "expired",
        _ if slot.is_available => "available",
        _ => "booked",
    }
}

fn csv_filter(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, is_available: bool) -> PartnerSlot {
        PartnerSlot {
            id: 1,
            partner_id: Some(7),
            start_time: start.to_string(),
            end_time: start.to_string(),
            is_available,
            created_at: None,
            partner: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2025-06-10", "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_past_slot_is_expired_even_when_booked() {
        assert_eq!(slot_status(&slot("2025-06-09T14:00:00", true), today()), "expired");
        assert_eq!(slot_status(&slot("2025-06-09T14:00:00", false), today()), "expired");
    }

    #[test]
    fn test_current_and_future_slots_show_booked_flag() {
        assert_eq!(slot_status(&slot("2025-06-10T14:00:00", true), today()), "available");
        assert_eq!(slot_status(&slot("2025-06-11T14:00:00", false), today()), "booked");
    }

    #[test]
    fn test_unparseable_date_falls_back_to_booked_flag() {
        assert_eq!(slot_status(&slot("soon", true), today()), "available");
    }

    #[test]
    fn test_csv_filter_splits_and_trims() {
        assert_eq!(csv_filter(Some("plumber, painter")), vec!["plumber", "painter"]);
        assert_eq!(csv_filter(Some("")), Vec::<String>::new());
        assert_eq!(csv_filter(None), Vec::<String>::new());
    }
}
