pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;
pub mod store;

use std::sync::Arc;

use crate::app::auth::AccessTokens;
use crate::app::presence::PresenceRegistry;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: AccessTokens,
    pub presence: PresenceRegistry,
}
