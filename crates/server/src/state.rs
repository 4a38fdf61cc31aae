//! Shared application state

use std::sync::Arc;

use chatdesk_agent::{DialogueRouter, SessionManager};
use chatdesk_config::Settings;
use chatdesk_persistence::AppointmentStore;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub store: Arc<dyn AppointmentStore>,
    pub router: Arc<DialogueRouter>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        sessions: Arc<SessionManager>,
        store: Arc<dyn AppointmentStore>,
        router: Arc<DialogueRouter>,
    ) -> Self {
        Self {
            settings,
            sessions,
            store,
            router,
        }
    }
}
