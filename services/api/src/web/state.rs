//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::GoogleOAuth;
use crate::config::Config;
use leximate_core::ports::{ChatGenerationService, DatabaseService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub chat_adapter: Arc<dyn ChatGenerationService>,
    /// Absent when no Google credentials are configured; the Google routes
    /// respond 503 in that case.
    pub google_oauth: Option<Arc<GoogleOAuth>>,
}
