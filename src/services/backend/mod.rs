pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::ApiError;
use crate::models::availability::{PartnerSlot, SlotRecord};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::matching::{RequestOutcome, SettledBooking};
use crate::models::user::{Customer, DashboardStats, LoginData, Partner};
use crate::session::Session;
use crate::validate::{ValidCustomerRegistration, ValidPartnerRegistration};

/// Desired slot a customer asks the matcher for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestPayload {
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotPayload {
    pub partner_id: i64,
    pub start_time: String,
    pub end_time: String,
}

/// Which bookings to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    Customer(i64),
    Partner(i64),
    All,
}

/// Typed face of the marketplace REST backend. Every method takes the
/// session whose identity the request must carry; nothing here retries,
/// and nothing holds hidden token state.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError>;

    async fn register_customer(
        &self,
        reg: &ValidCustomerRegistration,
    ) -> Result<serde_json::Value, ApiError>;

    async fn register_partner(
        &self,
        reg: &ValidPartnerRegistration,
    ) -> Result<serde_json::Value, ApiError>;

    async fn create_booking_request(
        &self,
        session: &Session,
        payload: &BookingRequestPayload,
    ) -> Result<RequestOutcome, ApiError>;

    async fn confirm_booking_request(
        &self,
        session: &Session,
        booking_request_id: &str,
        partner_id: i64,
    ) -> Result<SettledBooking, ApiError>;

    async fn list_bookings(
        &self,
        session: &Session,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, ApiError>;

    async fn update_booking_status(
        &self,
        session: &Session,
        booking_id: i64,
        status: &BookingStatus,
    ) -> Result<Booking, ApiError>;

    async fn list_availability(
        &self,
        session: &Session,
        partner_id: i64,
    ) -> Result<Vec<SlotRecord>, ApiError>;

    /// Every partner's slots, with the partner profile embedded.
    async fn list_all_availability(&self, session: &Session)
        -> Result<Vec<PartnerSlot>, ApiError>;

    async fn create_availability(
        &self,
        session: &Session,
        payload: &CreateSlotPayload,
    ) -> Result<SlotRecord, ApiError>;

    async fn delete_availability(&self, session: &Session, slot_id: i64) -> Result<(), ApiError>;

    async fn list_customers(&self, session: &Session) -> Result<Vec<Customer>, ApiError>;

    async fn list_partners(
        &self,
        session: &Session,
        service_type: Option<&str>,
    ) -> Result<Vec<Partner>, ApiError>;

    async fn dashboard_stats(&self, session: &Session) -> Result<DashboardStats, ApiError>;
}
