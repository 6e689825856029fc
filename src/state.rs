use crate::config::AppConfig;
use crate::services::backend::BackendApi;
use crate::session::SessionStore;

pub struct AppState {
    pub config: AppConfig,
    pub backend: Box<dyn BackendApi>,
    pub sessions: SessionStore,
}
