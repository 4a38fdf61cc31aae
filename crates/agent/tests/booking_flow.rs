//! End-to-end booking conversation through the dialogue router.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use chatdesk_agent::{route, ConversationalForm, DialogueRouter, Route, SessionManager};
use chatdesk_config::{IntentsConfig, PromptsConfig};
use chatdesk_core::{DocumentQa, FixedClock, FormState, QaAnswer, SourceDocument, SourceMetadata};
use chatdesk_persistence::{AppointmentStore, MemoryAppointmentStore};
use chatdesk_text_processing::RegexEmailChecker;

struct CannedQa;

#[async_trait]
impl DocumentQa for CannedQa {
    async fn answer(&self, _query: &str) -> QaAnswer {
        QaAnswer {
            result: "Our office opens at 9 am.".to_string(),
            source_documents: vec![SourceDocument {
                content: "Office hours: 9:00-17:00, Monday to Friday.".to_string(),
                metadata: SourceMetadata {
                    source: "faq.md".to_string(),
                },
            }],
        }
    }
}

// Monday
fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn form_with_store() -> (ConversationalForm, Arc<MemoryAppointmentStore>) {
    let store = Arc::new(MemoryAppointmentStore::new());
    let form = ConversationalForm::new(
        store.clone(),
        Arc::new(RegexEmailChecker),
        Arc::new(FixedClock::new(reference_date())),
        Arc::new(PromptsConfig::default()),
        Arc::new(IntentsConfig::default()),
        3,
    );
    (form, store)
}

fn router() -> DialogueRouter {
    DialogueRouter::new(Arc::new(CannedQa))
}

const BOOKING_TURNS: [&str; 8] = [
    "call me back",
    "Jane Doe",
    "+14155552671",
    "jane@example.com",
    "tomorrow",
    "2:30 pm",
    "discuss pricing",
    "yes",
];

#[tokio::test]
async fn books_an_appointment_over_eight_turns() {
    let (mut form, store) = form_with_store();
    let router = router();
    let keywords = IntentsConfig::default().appointment_keywords;

    let mut last = None;
    for message in BOOKING_TURNS {
        last = Some(router.dispatch(&mut form, message, &keywords).await);
    }

    let last = last.unwrap();
    assert_eq!(last.route, Route::Form);
    assert_eq!(last.reply.state, FormState::Completed);

    let record = last.reply.appointment.expect("booking should complete");
    assert_eq!(record.name, "Jane Doe");
    assert_eq!(record.phone, "+14155552671");
    assert_eq!(record.email, "jane@example.com");
    assert_eq!(record.appointment_date, "2024-06-11");
    assert_eq!(record.appointment_time, "14:30");
    assert_eq!(record.status.as_str(), "confirmed");

    // Exactly one record landed in the store.
    let stored = store.scan(&|_| true).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], record);
    assert!(store.is_slot_taken("2024-06-11", "14:30").unwrap());
}

#[tokio::test]
async fn questions_route_to_document_qa_until_the_form_takes_over() {
    let (mut form, _store) = form_with_store();
    let router = router();
    let keywords = IntentsConfig::default().appointment_keywords;

    let reply = router.dispatch(&mut form, "when do you open?", &keywords).await;
    assert_eq!(reply.route, Route::Qa);
    assert!(reply.reply.response.contains("Our office opens at 9 am."));
    assert!(reply.reply.response.contains("faq.md"));
    assert_eq!(reply.reply.state, FormState::Idle);

    let reply = router.dispatch(&mut form, "please call me back", &keywords).await;
    assert_eq!(reply.route, Route::Form);
    assert_eq!(reply.reply.state, FormState::CollectingName);

    // Mid-form, even question-shaped messages stay with the form.
    let reply = router.dispatch(&mut form, "why do you ask?", &keywords).await;
    assert_eq!(reply.route, Route::Form);
    assert_eq!(reply.reply.state, FormState::CollectingName);
}

#[tokio::test]
async fn retry_exhaustion_returns_routing_to_qa() {
    let (mut form, _store) = form_with_store();
    let router = router();
    let keywords = IntentsConfig::default().appointment_keywords;

    router.dispatch(&mut form, "call me back", &keywords).await;
    for _ in 0..3 {
        router.dispatch(&mut form, "...", &keywords).await;
    }
    assert_eq!(form.state(), FormState::Idle);

    // Aborted session means plain questions go back to QA.
    let reply = router.dispatch(&mut form, "when do you open?", &keywords).await;
    assert_eq!(reply.route, Route::Qa);
}

/// Same conversation through a managed session, locking the way the HTTP
/// chat handler does: decide the route first, then either process under a
/// short-lived lock or await the QA collaborator with no lock held.
#[tokio::test]
async fn managed_session_locks_per_turn() {
    let store = Arc::new(MemoryAppointmentStore::new());
    let manager = SessionManager::new(
        store.clone(),
        Arc::new(RegexEmailChecker),
        Arc::new(FixedClock::new(reference_date())),
        Arc::new(PromptsConfig::default()),
        Arc::new(IntentsConfig::default()),
        3,
    );
    let router = router();
    let id = manager.create();
    let form = manager.get(&id).unwrap();
    let keywords = manager.intents().appointment_keywords.clone();

    for message in ["when do you open?"].into_iter().chain(BOOKING_TURNS) {
        let decision = {
            let guard = form.lock();
            route(message, guard.state(), &keywords)
        };
        match decision {
            Route::Form => {
                form.lock().process_message(message);
            }
            Route::Qa => {
                let answer = router.answer_qa(message).await;
                assert!(answer.contains("Our office opens at 9 am."));
            }
        }
    }

    assert_eq!(form.lock().state(), FormState::Completed);
    assert_eq!(store.scan(&|_| true).unwrap().len(), 1);
}
