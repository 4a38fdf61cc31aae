//! Conversational booking agent
//!
//! The form engine at the heart of the product: a strict ordered state
//! machine over multi-turn dialogue, fed by opportunistic field extraction,
//! bounded by a retry budget and backed by the append-only appointment log.
//! The dialogue router decides per message whether the form or the external
//! document-QA collaborator answers, and the session manager keeps one form
//! per conversation.

pub mod form;
pub mod router;
pub mod session;

pub use form::{ConversationalForm, FormReply, FormSession};
pub use router::{route, DialogueRouter, Route, RoutedReply};
pub use session::SessionManager;
