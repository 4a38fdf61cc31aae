//! Appointment persistence for the chatdesk agent
//!
//! Completed bookings land in an append-only, newline-delimited JSON log.
//! Append is the only mutation; lookups re-read the log on every call so
//! they always observe a prefix of completed appends.

pub mod store;

pub use store::{
    AppointmentStore, JsonlAppointmentStore, MemoryAppointmentStore, ScanPredicate,
};

use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on appointment log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize appointment record: {0}")]
    Serialization(#[from] serde_json::Error),
}
