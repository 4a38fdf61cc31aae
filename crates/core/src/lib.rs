//! Core types for the chatdesk agent
//!
//! This crate provides foundational types used across all other crates:
//! - Booking data model (UserInfo, AppointmentRecord)
//! - Form state machine states
//! - Conversation turn types
//! - Clock capability for injectable time
//! - Document-QA collaborator trait

pub mod booking;
pub mod clock;
pub mod conversation;
pub mod qa;
pub mod state;

pub use booking::{AppointmentRecord, BookingStatus, FormField, UserInfo};
pub use clock::{Clock, FixedClock, SystemClock};
pub use conversation::{Turn, TurnRole};
pub use qa::{DocumentQa, QaAnswer, SourceDocument, SourceMetadata};
pub use state::FormState;
