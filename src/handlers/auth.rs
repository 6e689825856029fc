use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::{ApiError, AppError};
use crate::models::user::UserType;
use crate::session::{self, Session};
use crate::state::AppState;
use crate::validate::{
    validate_customer_registration, validate_login, validate_partner_registration,
    CustomerRegistrationForm, LoginForm, PartnerRegistrationForm,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    pub country: Option<String>,
}

impl From<&Session> for UserView {
    fn from(session: &Session) -> Self {
        UserView {
            id: session.user_id,
            name: session.name.clone(),
            email: session.email.clone(),
            user_type: session.user_type,
            country: session.country.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

// POST /api/session/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let valid = validate_login(&form).map_err(AppError::Validation)?;

    let data = state
        .backend
        .login(&valid.email, &valid.password)
        .await
        .map_err(|err| match err {
            ApiError::Unauthorized => AppError::Rejected("Invalid email or password".to_string()),
            ApiError::Backend { message, .. } => AppError::Rejected(message),
            other => AppError::Backend(other.message()),
        })?;

    let session = Session::from_login(&data);
    tracing::info!(user = %session.email, role = session.user_type.as_str(), "logged in");

    let user = UserView::from(&session);
    let token = state.sessions.create(session);
    Ok(Json(LoginResponse { token, user }))
}

// POST /api/session/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = session::bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    if state.sessions.remove(token) {
        tracing::info!("session ended");
        Ok(Json(json!({ "ok": true })))
    } else {
        Err(AppError::Unauthorized)
    }
}

// GET /api/session/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserView>, AppError> {
    let handle = state.sessions.authenticate(&headers)?;
    Ok(Json(UserView::from(&handle.session)))
}

// POST /api/register/customer
pub async fn register_customer(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CustomerRegistrationForm>,
) -> Result<Json<Value>, AppError> {
    let valid = validate_customer_registration(&form).map_err(AppError::Validation)?;

    state
        .backend
        .register_customer(&valid)
        .await
        .map_err(reject_registration)?;

    tracing::info!(user = %valid.email, "customer registered");
    Ok(Json(json!({ "ok": true })))
}

// POST /api/register/partner
pub async fn register_partner(
    State(state): State<Arc<AppState>>,
    Json(form): Json<PartnerRegistrationForm>,
) -> Result<Json<Value>, AppError> {
    let valid = validate_partner_registration(&form).map_err(AppError::Validation)?;

    state
        .backend
        .register_partner(&valid)
        .await
        .map_err(reject_registration)?;

    tracing::info!(user = %valid.email, service = %valid.service_type, "partner registered");
    Ok(Json(json!({ "ok": true })))
}

fn reject_registration(err: ApiError) -> AppError {
    match err {
        ApiError::Backend { message, .. } => AppError::Rejected(message),
        other => AppError::from(other),
    }
}
