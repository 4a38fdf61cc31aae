//! Fallback QA collaborator
//!
//! The real document-QA service is wired in by the deployment. Until it
//! is, non-appointment questions get a polite pointer to the booking flow.

use async_trait::async_trait;

use chatdesk_core::{DocumentQa, QaAnswer};

/// Stand-in used when no QA backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredQa;

#[async_trait]
impl DocumentQa for UnconfiguredQa {
    async fn answer(&self, _query: &str) -> QaAnswer {
        QaAnswer {
            result: "Document questions aren't available right now, but I can \
                     book an appointment for you - just say \"call me back\"."
                .to_string(),
            source_documents: Vec::new(),
        }
    }
}
