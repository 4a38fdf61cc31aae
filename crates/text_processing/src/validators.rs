//! Field validators
//!
//! Every validator is total: bad input yields `false` or `None`, never an
//! error. Normalization helpers live next to the checks that use them.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").expect("phone pattern compiles"));

/// A person's name: 2-50 characters after trimming, letters, spaces,
/// apostrophes and hyphens only, with at least one letter.
pub fn valid_name(s: &str) -> bool {
    let trimmed = s.trim();
    let len = trimmed.chars().count();
    if !(2..=50).contains(&len) {
        return false;
    }
    trimmed.chars().any(|c| c.is_alphabetic())
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-')
}

/// Strip everything except digits and a leading `+`.
pub fn normalize_phone(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.trim().chars().enumerate() {
        if c.is_ascii_digit() || (c == '+' && i == 0) {
            out.push(c);
        }
    }
    out
}

/// Optional leading `+` followed by 7-15 digits, after stripping
/// whitespace and separators.
pub fn valid_phone(s: &str) -> bool {
    PHONE_RE.is_match(&normalize_phone(s))
}

/// Strict `YYYY-MM-DD`, today or later relative to the injected date.
pub fn valid_date(s: &str, today: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        Ok(date) => date >= today,
        Err(_) => false,
    }
}

/// Strict 24-hour `HH:MM`.
pub fn valid_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").is_ok()
}

/// Syntactic email validation capability.
///
/// The form engine depends on this trait rather than a concrete checker so
/// tests can stub it; implementations must not perform network lookups.
pub trait EmailSyntaxChecker: Send + Sync {
    fn is_valid(&self, email: &str) -> bool;
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// Default checker: an RFC-5322-ish address shape with a dotted domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexEmailChecker;

impl EmailSyntaxChecker for RegexEmailChecker {
    fn is_valid(&self, email: &str) -> bool {
        EMAIL_RE.is_match(email.trim())
    }
}
