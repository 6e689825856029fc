use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{BackendApi, BookingFilter, BookingRequestPayload, CreateSlotPayload};
use crate::errors::ApiError;
use crate::models::availability::{PartnerSlot, SlotRecord};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::matching::{RequestOutcome, SettledBooking};
use crate::models::user::{Customer, DashboardStats, LoginData, Partner};
use crate::session::Session;
use crate::validate::{ValidCustomerRegistration, ValidPartnerRegistration};

/// reqwest client for the marketplace backend. One instance serves every
/// session; identity rides on each request, never on the client.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// A bare host gains an `https://` scheme; trailing slashes are
    /// dropped so path joining stays predictable.
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Legacy identity headers the availability and directory endpoints
    /// authenticate with.
    fn identity(req: RequestBuilder, session: &Session) -> RequestBuilder {
        req.header("x-user-id", session.user_id.to_string())
            .header("x-user-type", session.user_type.as_str())
            .header("x-user-email", session.email.clone())
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let payload = self.execute_raw(req).await?;
        serde_json::from_value(payload).map_err(|_| ApiError::Decode)
    }

    async fn execute_raw(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        unwrap_envelope(status, body)
    }
}

/// Applies the backend's envelope rule to one response: 401s collapse to
/// the canonical unauthorized error, `success: false` throws with the body
/// message, non-2xx throws preferring `{error, suggestion}` and then the
/// body message over the status text, and success unwraps `data`.
fn unwrap_envelope(status: StatusCode, body: Value) -> Result<Value, ApiError> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let token_rejected = matches!(
        message.as_deref(),
        Some(m) if m.contains("Authentication token required") || m.eq_ignore_ascii_case("unauthorized")
    );
    if status == StatusCode::UNAUTHORIZED || token_rejected {
        return Err(ApiError::Unauthorized);
    }

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Backend {
            message: message.unwrap_or_else(|| "Request failed".to_string()),
            suggestion: body
                .get("suggestion")
                .and_then(Value::as_str)
                .map(str::to_string),
        });
    }

    if !status.is_success() {
        // Some endpoints report errors as `{error, suggestion}` instead of
        // the message envelope; both keys must be present.
        let hinted = body.get("error").and_then(Value::as_str).and_then(|error| {
            let suggestion = body.get("suggestion").and_then(Value::as_str)?;
            Some(ApiError::Backend {
                message: error.to_string(),
                suggestion: Some(suggestion.to_string()),
            })
        });
        return Err(match (hinted, message) {
            (Some(err), _) => err,
            (None, Some(message)) => ApiError::backend(message),
            (None, None) => ApiError::Http {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            },
        });
    }

    if let Some(map) = body.as_object() {
        if map.contains_key("success") {
            if let Some(data) = map.get("data") {
                return Ok(data.clone());
            }
        }
    }
    Ok(body)
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginData, ApiError> {
        let req = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        self.execute(req).await
    }

    async fn register_customer(
        &self,
        reg: &ValidCustomerRegistration,
    ) -> Result<Value, ApiError> {
        let body = json!({
            "firstName": reg.first_name,
            "lastName": reg.last_name,
            "email": reg.email,
            "password": reg.password,
            "phone": reg.phone,
            "address": reg.address,
            "country": reg.country,
            "city": reg.city,
        });
        let req = self
            .client
            .post(self.url("/auth/register/customer"))
            .json(&body);
        self.execute_raw(req).await
    }

    async fn register_partner(&self, reg: &ValidPartnerRegistration) -> Result<Value, ApiError> {
        let body = json!({
            "firstName": reg.first_name,
            "lastName": reg.last_name,
            "email": reg.email,
            "phone": reg.phone,
            "password": reg.password,
            "serviceType": reg.service_type,
            "hourlyRate": reg.hourly_rate,
            "description": reg.description,
            "country": reg.country,
            "cities": reg.cities,
        });
        let req = self
            .client
            .post(self.url("/auth/register/partner"))
            .json(&body);
        self.execute_raw(req).await
    }

    async fn create_booking_request(
        &self,
        session: &Session,
        payload: &BookingRequestPayload,
    ) -> Result<RequestOutcome, ApiError> {
        let req = self
            .client
            .post(self.url("/bookings/booking-request"))
            .bearer_auth(&session.access_token)
            .json(payload);
        self.execute(req).await
    }

    async fn confirm_booking_request(
        &self,
        session: &Session,
        booking_request_id: &str,
        partner_id: i64,
    ) -> Result<SettledBooking, ApiError> {
        let body = json!({
            "bookingRequestId": booking_request_id,
            "partnerId": partner_id,
        });
        let req = self
            .client
            .post(self.url("/bookings/booking-request/confirm"))
            .bearer_auth(&session.access_token)
            .json(&body);
        self.execute(req).await
    }

    async fn list_bookings(
        &self,
        session: &Session,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, ApiError> {
        let mut req = self
            .client
            .get(self.url("/bookings"))
            .bearer_auth(&session.access_token);
        match filter {
            BookingFilter::Customer(id) => req = req.query(&[("customerId", id)]),
            BookingFilter::Partner(id) => req = req.query(&[("partnerId", id)]),
            BookingFilter::All => {}
        }
        self.execute(req).await
    }

    async fn update_booking_status(
        &self,
        session: &Session,
        booking_id: i64,
        status: &BookingStatus,
    ) -> Result<Booking, ApiError> {
        let path = format!("/bookings/{booking_id}/status/{}", status.as_str());
        let req = self
            .client
            .patch(self.url(&path))
            .bearer_auth(&session.access_token);
        self.execute(req).await
    }

    async fn list_availability(
        &self,
        session: &Session,
        partner_id: i64,
    ) -> Result<Vec<SlotRecord>, ApiError> {
        let req = Self::identity(
            self.client
                .get(self.url("/availability"))
                .query(&[("partnerId", partner_id)]),
            session,
        );
        self.execute(req).await
    }

    async fn list_all_availability(
        &self,
        session: &Session,
    ) -> Result<Vec<PartnerSlot>, ApiError> {
        let req = Self::identity(self.client.get(self.url("/availability")), session);
        self.execute(req).await
    }

    async fn create_availability(
        &self,
        session: &Session,
        payload: &CreateSlotPayload,
    ) -> Result<SlotRecord, ApiError> {
        let req = Self::identity(
            self.client.post(self.url("/availability")).json(payload),
            session,
        );
        self.execute(req).await
    }

    async fn delete_availability(&self, session: &Session, slot_id: i64) -> Result<(), ApiError> {
        let req = Self::identity(
            self.client.delete(self.url(&format!("/availability/{slot_id}"))),
            session,
        );
        self.execute_raw(req).await?;
        Ok(())
    }

    async fn list_customers(&self, session: &Session) -> Result<Vec<Customer>, ApiError> {
        let req = Self::identity(self.client.get(self.url("/customers")), session);
        self.execute(req).await
    }

    async fn list_partners(
        &self,
        session: &Session,
        service_type: Option<&str>,
    ) -> Result<Vec<Partner>, ApiError> {
        let mut req = self.client.get(self.url("/partners"));
        if let Some(service_type) = service_type {
            req = req.query(&[("serviceType", service_type)]);
        }
        self.execute(Self::identity(req, session)).await
    }

    async fn dashboard_stats(&self, session: &Session) -> Result<DashboardStats, ApiError> {
        let req = self
            .client
            .get(self.url("/stats"))
            .bearer_auth(&session.access_token);
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(
            HttpBackend::new("http://localhost:3002/api/").base_url,
            "http://localhost:3002/api"
        );
        assert_eq!(
            HttpBackend::new("api.example.com/v1").base_url,
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn test_envelope_success_unwraps_data() {
        let body = json!({ "success": true, "data": { "id": 5 } });
        let payload = unwrap_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(payload["id"], 5);
    }

    #[test]
    fn test_envelope_without_success_field_returns_body() {
        let body = json!([{ "id": 1 }, { "id": 2 }]);
        let payload = unwrap_envelope(StatusCode::OK, body.clone()).unwrap();
        assert_eq!(payload, body);
    }

    #[test]
    fn test_envelope_failure_throws_message() {
        let body = json!({ "success": false, "message": "Email already registered" });
        let err = unwrap_envelope(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.message(), "Email already registered");
    }

    #[test]
    fn test_non_2xx_prefers_body_message() {
        let body = json!({ "message": "Partner is no longer available" });
        let err = unwrap_envelope(StatusCode::CONFLICT, body).unwrap_err();
        assert_eq!(err.message(), "Partner is no longer available");
    }

    #[test]
    fn test_non_2xx_without_message_uses_status() {
        let err = unwrap_envelope(StatusCode::INTERNAL_SERVER_ERROR, Value::Null).unwrap_err();
        assert_eq!(err.message(), "HTTP 500");
    }

    #[test]
    fn test_401_is_canonical() {
        let body = json!({ "message": "token invalid" });
        let err = unwrap_envelope(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.message(), "Please log in to continue");
    }

    #[test]
    fn test_token_required_message_is_canonical_whatever_the_status() {
        let body = json!({ "success": false, "message": "Authentication token required" });
        let err = unwrap_envelope(StatusCode::FORBIDDEN, body).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_non_2xx_error_key_with_suggestion() {
        let body = json!({
            "error": "No partners available in this area",
            "suggestion": "Try a different country",
        });
        let err = unwrap_envelope(StatusCode::NOT_FOUND, body).unwrap_err();
        match err {
            ApiError::Backend { message, suggestion } => {
                assert_eq!(message, "No partners available in this area");
                assert_eq!(suggestion.as_deref(), Some("Try a different country"));
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_2xx_error_key_without_suggestion_uses_status() {
        let body = json!({ "error": "boom" });
        let err = unwrap_envelope(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert_eq!(err.message(), "HTTP 500");
    }

    #[test]
    fn test_envelope_failure_carries_suggestion() {
        let body = json!({
            "success": false,
            "message": "Slot unavailable",
            "suggestion": "Pick another time",
        });
        let err = unwrap_envelope(StatusCode::OK, body).unwrap_err();
        match err {
            ApiError::Backend { suggestion, .. } => {
                assert_eq!(suggestion.as_deref(), Some("Pick another time"));
            }
            other => panic!("expected Backend error, got {other:?}"),
        }
    }
}
