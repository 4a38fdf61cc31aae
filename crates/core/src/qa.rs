//! Document-QA collaborator boundary
//!
//! The retrieval-augmented QA side of the product (embeddings, vector
//! search, LLM invocation) lives outside this workspace. The dialogue
//! router only needs a narrow answer interface; implementations are wired
//! in by the embedding application.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata attached to a retrieved source document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source: String,
}

/// One retrieved document chunk backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub content: String,
    #[serde(default)]
    pub metadata: SourceMetadata,
}

/// Answer returned by the QA collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaAnswer {
    pub result: String,
    #[serde(default)]
    pub source_documents: Vec<SourceDocument>,
}

/// External document question-answering collaborator.
#[async_trait]
pub trait DocumentQa: Send + Sync {
    async fn answer(&self, query: &str) -> QaAnswer;
}
