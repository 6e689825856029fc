use std::env;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub backend_api_url: String,
    pub cors_allow_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            port: parse_port(env::var("PORT").ok())?,
            backend_api_url: env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| "http://localhost:3002/api".to_string()),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Unset or empty means the default; anything else must parse. A typoed
/// port should stop the process, not silently bind 3000.
fn parse_port(raw: Option<String>) -> Result<u16, AppError> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(3000),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("PORT is not a valid port number: {raw:?}"))),
    }
}
