//! Append-only appointment store

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::Mutex;

use chatdesk_core::AppointmentRecord;

use crate::PersistenceError;

/// Predicate over records for [`AppointmentStore::scan`].
pub type ScanPredicate<'a> = &'a dyn Fn(&AppointmentRecord) -> bool;

/// Durable store for completed bookings.
///
/// Methods are synchronous: the form engine runs one message at a time and
/// must not suspend mid-dispatch. Implementations must keep `append`
/// line-atomic under concurrent callers.
pub trait AppointmentStore: Send + Sync {
    /// Persist one record. Never overwrites prior records.
    fn append(&self, record: &AppointmentRecord) -> Result<(), PersistenceError>;

    /// All records matching the predicate, in append order.
    fn scan(&self, predicate: ScanPredicate<'_>) -> Result<Vec<AppointmentRecord>, PersistenceError>;

    /// Records whose name, email (case-insensitive) or phone contains `term`.
    fn find_by_contact(&self, term: &str) -> Result<Vec<AppointmentRecord>, PersistenceError> {
        let lower = term.to_lowercase();
        self.scan(&|r| {
            r.name.to_lowercase().contains(&lower)
                || r.email.to_lowercase().contains(&lower)
                || r.phone.contains(term)
        })
    }

    /// Records booked for exactly `date`.
    fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AppointmentRecord>, PersistenceError> {
        let iso = date.format("%Y-%m-%d").to_string();
        self.scan(&|r| r.appointment_date == iso)
    }

    /// True if some record already occupies the exact date and time slot.
    fn is_slot_taken(&self, date: &str, time: &str) -> Result<bool, PersistenceError> {
        Ok(!self
            .scan(&|r| r.appointment_date == date && r.appointment_time == time)?
            .is_empty())
    }

    /// Human-readable listing of every booking.
    fn summary(&self) -> Result<String, PersistenceError> {
        let records = self.scan(&|_| true)?;
        if records.is_empty() {
            return Ok("No appointments scheduled.".to_string());
        }
        let mut out = format!("Total appointments: {}\n", records.len());
        for (i, r) in records.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} - {} at {}\n   Phone: {}, Email: {}\n   Reason: {}\n",
                i + 1,
                r.name,
                r.appointment_date,
                r.appointment_time,
                r.phone,
                r.email,
                r.reason
            ));
        }
        Ok(out)
    }
}

/// File-backed store: one JSON record per line, UTF-8, append-only.
///
/// A writer mutex plus a single `write_all` per record keeps concurrent
/// appends from interleaving. Scans open the file fresh each call; a
/// missing log reads as empty, and malformed lines are skipped with a
/// warning rather than failing the whole scan.
pub struct JsonlAppointmentStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonlAppointmentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppointmentStore for JsonlAppointmentStore {
    fn append(&self, record: &AppointmentRecord) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.writer.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        tracing::info!(
            id = %record.id,
            date = %record.appointment_date,
            time = %record.appointment_time,
            "Appointment appended to log"
        );
        Ok(())
    }

    fn scan(&self, predicate: ScanPredicate<'_>) -> Result<Vec<AppointmentRecord>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AppointmentRecord>(&line) {
                Ok(record) => {
                    if predicate(&record) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed log line");
                }
            }
        }
        Ok(records)
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    records: Mutex<Vec<AppointmentRecord>>,
    /// When set, `append` fails with this I/O error kind.
    fail_appends: Mutex<bool>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail, for exercising the booking-failure path.
    pub fn set_fail_appends(&self, fail: bool) {
        *self.fail_appends.lock() = fail;
    }
}

impl AppointmentStore for MemoryAppointmentStore {
    fn append(&self, record: &AppointmentRecord) -> Result<(), PersistenceError> {
        if *self.fail_appends.lock() {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "appointment log is unwritable",
            )));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn scan(&self, predicate: ScanPredicate<'_>) -> Result<Vec<AppointmentRecord>, PersistenceError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }
}
