//! Form state machine states

use serde::{Deserialize, Serialize};

/// States of the appointment booking form.
///
/// The happy path runs strictly in order from `Idle` through the collection
/// states to `Confirming` and `Completed`. `Idle` and `Completed` are
/// resting states reachable again only via explicit reset; the retry-limit
/// abort edge leads from any collecting state back to `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    #[default]
    Idle,
    CollectingName,
    CollectingPhone,
    CollectingEmail,
    CollectingDate,
    CollectingTime,
    CollectingReason,
    Confirming,
    Completed,
}

impl FormState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CollectingName => "collecting_name",
            Self::CollectingPhone => "collecting_phone",
            Self::CollectingEmail => "collecting_email",
            Self::CollectingDate => "collecting_date",
            Self::CollectingTime => "collecting_time",
            Self::CollectingReason => "collecting_reason",
            Self::Confirming => "confirming",
            Self::Completed => "completed",
        }
    }

    /// Successor on the ordered collection path.
    pub fn next(&self) -> FormState {
        match self {
            Self::Idle => Self::CollectingName,
            Self::CollectingName => Self::CollectingPhone,
            Self::CollectingPhone => Self::CollectingEmail,
            Self::CollectingEmail => Self::CollectingDate,
            Self::CollectingDate => Self::CollectingTime,
            Self::CollectingTime => Self::CollectingReason,
            Self::CollectingReason => Self::Confirming,
            Self::Confirming => Self::Completed,
            Self::Completed => Self::Completed,
        }
    }

    /// True for the states that ask the user for one field.
    pub fn is_collecting(&self) -> bool {
        matches!(
            self,
            Self::CollectingName
                | Self::CollectingPhone
                | Self::CollectingEmail
                | Self::CollectingDate
                | Self::CollectingTime
                | Self::CollectingReason
        )
    }
}

impl std::fmt::Display for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
