//! Per-conversation session registry
//!
//! Each session id maps to one form behind its own mutex, so separate
//! conversations proceed concurrently while a single session only ever has
//! one message in flight. Sessions live in memory only; a restart drops
//! them (the appointment log is the durable part).

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use chatdesk_config::{IntentsConfig, PromptsConfig};
use chatdesk_core::Clock;
use chatdesk_persistence::AppointmentStore;
use chatdesk_text_processing::EmailSyntaxChecker;

use crate::form::ConversationalForm;

/// Creates forms and tracks them by session id.
pub struct SessionManager {
    sessions: DashMap<Uuid, Arc<Mutex<ConversationalForm>>>,
    store: Arc<dyn AppointmentStore>,
    email_checker: Arc<dyn EmailSyntaxChecker>,
    clock: Arc<dyn Clock>,
    prompts: Arc<PromptsConfig>,
    intents: Arc<IntentsConfig>,
    max_retries: u32,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        email_checker: Arc<dyn EmailSyntaxChecker>,
        clock: Arc<dyn Clock>,
        prompts: Arc<PromptsConfig>,
        intents: Arc<IntentsConfig>,
        max_retries: u32,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            store,
            email_checker,
            clock,
            prompts,
            intents,
            max_retries,
        }
    }

    pub fn intents(&self) -> &IntentsConfig {
        &self.intents
    }

    /// Open a new session with a fresh idle form.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let form = ConversationalForm::new(
            self.store.clone(),
            self.email_checker.clone(),
            self.clock.clone(),
            self.prompts.clone(),
            self.intents.clone(),
            self.max_retries,
        );
        self.sessions.insert(id, Arc::new(Mutex::new(form)));
        tracing::info!(session_id = %id, "Session created");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Mutex<ConversationalForm>>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Reset a session's form back to idle. Returns false for unknown ids.
    pub fn reset(&self, id: &Uuid) -> bool {
        match self.get(id) {
            Some(form) => {
                form.lock().reset();
                true
            }
            None => false,
        }
    }

    /// Drop a session entirely. Returns false for unknown ids.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::{FixedClock, FormState};
    use chatdesk_persistence::MemoryAppointmentStore;
    use chatdesk_text_processing::RegexEmailChecker;
    use chrono::NaiveDate;

    fn manager() -> SessionManager {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        SessionManager::new(
            Arc::new(MemoryAppointmentStore::new()),
            Arc::new(RegexEmailChecker),
            Arc::new(FixedClock::new(date)),
            Arc::new(PromptsConfig::default()),
            Arc::new(IntentsConfig::default()),
            3,
        )
    }

    #[test]
    fn test_create_get_remove() {
        let manager = manager();
        let id = manager.create();
        assert!(manager.get(&id).is_some());
        assert_eq!(manager.len(), 1);
        assert!(manager.remove(&id));
        assert!(manager.get(&id).is_none());
        assert!(!manager.remove(&id));
    }

    #[test]
    fn test_sessions_are_independent() {
        let manager = manager();
        let a = manager.create();
        let b = manager.create();

        let form_a = manager.get(&a).unwrap();
        form_a.lock().process_message("call me back");
        assert_eq!(form_a.lock().state(), FormState::CollectingName);

        let form_b = manager.get(&b).unwrap();
        assert_eq!(form_b.lock().state(), FormState::Idle);
    }

    #[test]
    fn test_reset_returns_form_to_idle() {
        let manager = manager();
        let id = manager.create();
        let form = manager.get(&id).unwrap();
        form.lock().process_message("call me back");
        assert!(manager.reset(&id));
        assert_eq!(form.lock().state(), FormState::Idle);
        assert!(!manager.reset(&Uuid::new_v4()));
    }
}
