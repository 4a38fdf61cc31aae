//! Dialogue routing between the booking form and document QA
//!
//! The contract is deliberately blunt: any non-idle form owns the
//! conversation outright, and in idle the appointment keyword set decides.
//! Document QA is an external collaborator behind [`DocumentQa`]; the
//! router only formats its answers.

use std::sync::Arc;

use chatdesk_core::{DocumentQa, FormState, QaAnswer};
use chatdesk_text_processing::matches_appointment_intent;

use crate::form::{ConversationalForm, FormReply};

/// Where a message goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Form,
    Qa,
}

/// Routing decision for one message against one session's form state.
pub fn route(message: &str, form_state: FormState, keywords: &[String]) -> Route {
    if form_state != FormState::Idle || matches_appointment_intent(message, keywords) {
        Route::Form
    } else {
        Route::Qa
    }
}

/// Reply from the router: the text plus which side produced it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoutedReply {
    pub route: Route,
    pub reply: FormReply,
}

/// Drives one conversation: form turns run synchronously, QA turns await
/// the collaborator.
pub struct DialogueRouter {
    qa: Arc<dyn DocumentQa>,
}

impl DialogueRouter {
    pub fn new(qa: Arc<dyn DocumentQa>) -> Self {
        Self { qa }
    }

    pub async fn dispatch(
        &self,
        form: &mut ConversationalForm,
        message: &str,
        keywords: &[String],
    ) -> RoutedReply {
        match route(message, form.state(), keywords) {
            Route::Form => {
                let reply = form.process_message(message);
                RoutedReply {
                    route: Route::Form,
                    reply,
                }
            }
            Route::Qa => RoutedReply {
                route: Route::Qa,
                reply: FormReply {
                    response: self.answer_qa(message).await,
                    state: form.state(),
                    appointment: None,
                },
            },
        }
    }

    /// Ask the QA collaborator and render its answer. Callers that hold a
    /// form lock should drop it first; this awaits the collaborator.
    pub async fn answer_qa(&self, query: &str) -> String {
        tracing::debug!("Routing message to document QA");
        let answer = self.qa.answer(query).await;
        format_qa_answer(&answer)
    }
}

/// Render a QA answer with up to two supporting source snippets.
fn format_qa_answer(answer: &QaAnswer) -> String {
    let mut out = answer.result.clone();
    for doc in answer.source_documents.iter().take(2) {
        let snippet: String = doc.content.chars().take(200).collect();
        out.push_str("\n\n> ");
        out.push_str(snippet.trim());
        if !doc.metadata.source.is_empty() {
            out.push_str(&format!("\n> ({})", doc.metadata.source));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::{SourceDocument, SourceMetadata};

    fn keywords() -> Vec<String> {
        ["call me", "book appointment"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_contract() {
        let kw = keywords();
        assert_eq!(route("call me back", FormState::Idle, &kw), Route::Form);
        assert_eq!(route("what is rust?", FormState::Idle, &kw), Route::Qa);
        // Any non-idle state owns the conversation
        assert_eq!(route("what is rust?", FormState::CollectingName, &kw), Route::Form);
        assert_eq!(route("what is rust?", FormState::Confirming, &kw), Route::Form);
        assert_eq!(route("what is rust?", FormState::Completed, &kw), Route::Form);
    }

    #[test]
    fn test_qa_answer_formatting_caps_sources() {
        let answer = QaAnswer {
            result: "Rust is a systems language.".to_string(),
            source_documents: vec![
                SourceDocument {
                    content: "Rust is a multi-paradigm language.".to_string(),
                    metadata: SourceMetadata { source: "intro.md".to_string() },
                },
                SourceDocument {
                    content: "It emphasizes memory safety.".to_string(),
                    metadata: SourceMetadata::default(),
                },
                SourceDocument {
                    content: "A third document.".to_string(),
                    metadata: SourceMetadata::default(),
                },
            ],
        };
        let out = format_qa_answer(&answer);
        assert!(out.starts_with("Rust is a systems language."));
        assert!(out.contains("intro.md"));
        assert!(out.contains("memory safety"));
        assert!(!out.contains("third document"));
    }
}
