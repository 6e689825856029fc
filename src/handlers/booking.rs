use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::availability::{extract_date, extract_time};
use crate::models::booking::{Booking, BookingStatus, ServiceProfile, ServiceType, StatusBadge};
use crate::models::user::{country_code, UserType};
use crate::services::backend::{BookingFilter, BookingRequestPayload};
use crate::services::booking_flow::{self, FlowView};
use crate::state::AppState;
use crate::validate::{validate_booking_request, BookingRequestForm};

// POST /api/booking/request
pub async fn request_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<BookingRequestForm>,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Customer)?;
    let valid = validate_booking_request(&form).map_err(AppError::Validation)?;

    // Country filter: an explicit value wins, else the customer's profile
    // country mapped to the ISO code the matcher expects.
    let country = valid.country.clone().or_else(|| {
        handle
            .session
            .country
            .as_deref()
            .map(country_code)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
    });

    let payload = BookingRequestPayload {
        start_time: valid.start_time,
        end_time: valid.end_time,
        country,
        service_type: valid.service_type,
    };
    let view = booking_flow::submit_request(
        &handle.flow,
        state.backend.as_ref(),
        &handle.session,
        &payload,
    )
    .await?;
    Ok(Json(view))
}

// POST /api/booking/confirm
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmForm {
    pub partner_id: i64,
}

pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<ConfirmForm>,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Customer)?;
    let view = booking_flow::submit_confirm(
        &handle.flow,
        state.backend.as_ref(),
        &handle.session,
        form.partner_id,
    )
    .await?;
    Ok(Json(view))
}

// POST /api/booking/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Customer)?;
    let mut flow = handle.flow.lock().unwrap();
    flow.cancel();
    Ok(Json(flow.view()))
}

// GET /api/booking/state
pub async fn booking_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FlowView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Customer)?;
    let flow = handle.flow.lock().unwrap();
    Ok(Json(flow.view()))
}

// GET /api/bookings
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: i64,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: String,
    pub badge: StatusBadge,
    pub service: Option<ServiceProfile>,
    pub customer_name: Option<String>,
    pub partner_name: Option<String>,
    pub total_amount: Option<f64>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        BookingView {
            id: booking.id,
            date: extract_date(&booking.start_time).to_string(),
            start_time: extract_time(&booking.start_time).map(str::to_string),
            end_time: extract_time(&booking.end_time).map(str::to_string),
            status: booking.status.as_str().to_string(),
            badge: booking.status.badge(),
            service: booking.display_service_type().map(ServiceType::profile),
            customer_name: booking
                .customer
                .as_ref()
                .map(|c| format!("{} {}", c.first_name, c.last_name)),
            partner_name: booking
                .partner
                .as_ref()
                .map(|p| format!("{} {}", p.first_name, p.last_name)),
            total_amount: booking.total_amount,
        }
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    let filter = match handle.session.user_type {
        UserType::Customer => BookingFilter::Customer(handle.session.user_id),
        UserType::Partner => BookingFilter::Partner(handle.session.user_id),
        UserType::Admin => BookingFilter::All,
    };
    let bookings = state.backend.list_bookings(&handle.session, filter).await?;
    Ok(Json(bookings.iter().map(BookingView::from).collect()))
}

// PATCH /api/bookings/:id/status/:status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((id, status)): Path<(i64, String)>,
) -> Result<Json<BookingView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    if handle.session.user_type == UserType::Customer {
        return Err(AppError::Forbidden(
            "Customers cannot change booking status directly".to_string(),
        ));
    }
    let status = BookingStatus::parse(&status);
    let booking = state
        .backend
        .update_booking_status(&handle.session, id, &status)
        .await?;
    tracing::info!(booking = id, status = status.as_str(), "booking status updated");
    Ok(Json(BookingView::from(&booking)))
}

// GET /api/services
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalogEntry {
    pub service_type: String,
    pub label: String,
    pub icon: Option<&'static str>,
    pub partners: usize,
}

pub async fn service_catalog(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ServiceCatalogEntry>>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    handle.require(UserType::Customer)?;

    // Counts are decoration; the catalog still renders if the directory
    // call fails.
    let partners = match state.backend.list_partners(&handle.session, None).await {
        Ok(partners) => partners,
        Err(err) => {
            tracing::warn!(error = %err, "partner directory unavailable, rendering zero counts");
            Vec::new()
        }
    };

    let entries = ServiceType::ALL
        .iter()
        .map(|service| {
            let profile = service.profile();
            ServiceCatalogEntry {
                service_type: service.as_str().to_string(),
                label: profile.label,
                icon: profile.icon,
                partners: partners
                    .iter()
                    .filter(|p| &p.service_type == service)
                    .count(),
            }
        })
        .collect();
    Ok(Json(entries))
}
