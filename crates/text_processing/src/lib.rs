//! Text processing for the chatdesk agent
//!
//! Pure, stateless building blocks the form engine runs on every turn:
//! - Field validators (name, phone, email, date, time)
//! - Best-effort field extraction from free text
//! - Natural-language date resolution
//! - Keyword-based intent matching and yes/no classification
//!
//! Nothing in this crate touches the network or the filesystem; the email
//! check is syntactic only, behind the injectable [`EmailSyntaxChecker`].

pub mod dates;
pub mod extract;
pub mod intent;
pub mod validators;

pub use dates::resolve_date;
pub use extract::{ExtractedFields, FieldExtractor};
pub use intent::{classify_confirmation, matches_appointment_intent, parse_field_mention, Confirmation};
pub use validators::{
    normalize_phone, valid_date, valid_name, valid_phone, valid_time, EmailSyntaxChecker,
    RegexEmailChecker,
};
