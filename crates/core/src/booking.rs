//! Booking data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status as persisted in the appointment log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The six collectable booking fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Phone,
    Email,
    Date,
    Time,
    Reason,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Date => "date",
            Self::Time => "time",
            Self::Reason => "reason",
        }
    }
}

/// Contact and scheduling details collected over one booking session.
///
/// All fields start unset and are filled incrementally by the form engine.
/// `None` is distinct from an empty string: an unset field is one the
/// dialogue has not yet collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// ISO `YYYY-MM-DD`
    pub appointment_date: Option<String>,
    /// 24-hour `HH:MM`
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
}

impl UserInfo {
    /// True once every field has been collected and validated.
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.phone.is_some()
            && self.email.is_some()
            && self.appointment_date.is_some()
            && self.appointment_time.is_some()
            && self.reason.is_some()
    }
}

/// Immutable snapshot written to the appointment log at booking completion.
///
/// The form engine guarantees by construction that every persisted record
/// has all six contact fields present. Serialized as one JSON object per
/// log line; consumers must treat unknown or missing fields as optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub status: BookingStatus,
}

impl AppointmentRecord {
    /// Build a record from completed user info.
    ///
    /// Returns `None` if any field is still unset; callers reach this only
    /// from the confirming state where completeness already holds.
    pub fn from_user_info(info: &UserInfo, created_at: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            id: Uuid::new_v4(),
            name: info.name.clone()?,
            phone: info.phone.clone()?,
            email: info.email.clone()?,
            appointment_date: info.appointment_date.clone()?,
            appointment_time: info.appointment_time.clone()?,
            reason: info.reason.clone()?,
            created_at,
            status: BookingStatus::Confirmed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_info() -> UserInfo {
        UserInfo {
            name: Some("Jane Doe".into()),
            phone: Some("+14155552671".into()),
            email: Some("jane@example.com".into()),
            appointment_date: Some("2024-06-11".into()),
            appointment_time: Some("14:30".into()),
            reason: Some("discuss pricing".into()),
        }
    }

    #[test]
    fn test_completeness() {
        let mut info = filled_info();
        assert!(info.is_complete());
        info.reason = None;
        assert!(!info.is_complete());
    }

    #[test]
    fn test_record_from_partial_info_is_none() {
        let info = UserInfo {
            name: Some("Jane".into()),
            ..Default::default()
        };
        assert!(AppointmentRecord::from_user_info(&info, Utc::now()).is_none());
    }

    #[test]
    fn test_record_roundtrip_tolerates_missing_id() {
        // Log lines written by older builds have no id field.
        let line = r#"{"name":"Jane Doe","phone":"+14155552671","email":"jane@example.com","appointment_date":"2024-06-11","appointment_time":"14:30","reason":"pricing","created_at":"2024-06-10T12:00:00Z","status":"confirmed"}"#;
        let record: AppointmentRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.status, BookingStatus::Confirmed);
        assert_eq!(record.appointment_time, "14:30");
    }
}
