pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod validate;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::state::AppState;

/// Full route table of the service. `main` and the integration tests both
/// build the app through here so they always agree.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/session/login", post(handlers::auth::login))
        .route("/api/session/logout", post(handlers::auth::logout))
        .route("/api/session/me", get(handlers::auth::me))
        .route(
            "/api/register/customer",
            post(handlers::auth::register_customer),
        )
        .route(
            "/api/register/partner",
            post(handlers::auth::register_partner),
        )
        .route("/api/services", get(handlers::booking::service_catalog))
        .route("/api/booking/request", post(handlers::booking::request_booking))
        .route("/api/booking/confirm", post(handlers::booking::confirm_booking))
        .route("/api/booking/cancel", post(handlers::booking::cancel_booking))
        .route("/api/booking/state", get(handlers::booking::booking_state))
        .route("/api/bookings", get(handlers::booking::list_bookings))
        .route(
            "/api/bookings/:id/status/:status",
            patch(handlers::booking::update_status),
        )
        .route(
            "/api/availability",
            get(handlers::availability::load_availability),
        )
        .route(
            "/api/availability/commit",
            post(handlers::availability::commit_availability),
        )
        .route(
            "/api/availability/:id",
            delete(handlers::availability::remove_slot),
        )
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .route(
            "/api/admin/availability",
            get(handlers::admin::get_availability),
        )
        .route("/api/admin/customers", get(handlers::admin::get_customers))
        .route("/api/admin/partners", get(handlers::admin::get_partners))
        .with_state(state)
}
