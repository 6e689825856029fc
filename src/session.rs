use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::availability::AvailabilitySlot;
use crate::models::user::{LoginData, UserType};
use crate::services::booking_flow::BookingFlow;

/// Identity of a logged-in user. Built once at login, dropped at logout,
/// and passed explicitly into every backend call.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub user_type: UserType,
    pub email: String,
    pub name: String,
    pub country: Option<String>,
    pub access_token: String,
}

impl Session {
    pub fn from_login(data: &LoginData) -> Self {
        Self {
            user_id: data.user.id,
            user_type: data.user_type,
            email: data.user.email.clone(),
            name: data.user.display_name(),
            country: data.user.country.clone(),
            access_token: data.access_token.clone(),
        }
    }
}

/// Everything kept for one browser session: the identity plus the mutable
/// per-session state (active booking flow, partner slot cache). Locks are
/// held only for short synchronous sections, never across an await.
pub struct SessionHandle {
    pub session: Session,
    pub flow: Mutex<BookingFlow>,
    /// Partner slot cache; None until the first load from the backend.
    pub slots: Mutex<Option<Vec<AvailabilitySlot>>>,
    /// At most one availability batch commit in flight per session.
    pub committing: AtomicBool,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            session,
            flow: Mutex::new(BookingFlow::new()),
            slots: Mutex::new(None),
            committing: AtomicBool::new(false),
        }
    }

    pub fn require(&self, role: UserType) -> Result<(), AppError> {
        if self.session.user_type == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action requires a {} account",
                role.as_str()
            )))
        }
    }
}

/// In-memory session registry keyed by the opaque token handed to the
/// browser at login.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, session: Session) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.inner
            .lock()
            .unwrap()
            .insert(token.clone(), Arc::new(SessionHandle::new(session)));
        token
    }

    pub fn get(&self, token: &str) -> Option<Arc<SessionHandle>> {
        self.inner.lock().unwrap().get(token).cloned()
    }

    /// Tears down the session; flow state and slot cache die with it.
    pub fn remove(&self, token: &str) -> bool {
        self.inner.lock().unwrap().remove(token).is_some()
    }

    /// Resolves the session behind a request's bearer token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Arc<SessionHandle>, AppError> {
        let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
        self.get(token).ok_or(AppError::Unauthorized)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_type: UserType) -> Session {
        Session {
            user_id: 7,
            user_type,
            email: "jo@example.com".to_string(),
            name: "Jo Keller".to_string(),
            country: Some("Germany".to_string()),
            access_token: "tok-1".to_string(),
        }
    }

    #[test]
    fn test_create_get_remove() {
        let store = SessionStore::new();
        let token = store.create(session(UserType::Customer));
        assert!(store.get(&token).is_some());
        assert!(store.remove(&token));
        assert!(store.get(&token).is_none());
        assert!(!store.remove(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let store = SessionStore::new();
        let a = store.create(session(UserType::Customer));
        let b = store.create(session(UserType::Customer));
        assert_ne!(a, b);
    }

    #[test]
    fn test_role_gate() {
        let store = SessionStore::new();
        let token = store.create(session(UserType::Partner));
        let handle = store.get(&token).unwrap();
        assert!(handle.require(UserType::Partner).is_ok());
        assert!(matches!(
            handle.require(UserType::Customer),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
        headers.insert("authorization", "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
