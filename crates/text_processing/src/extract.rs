//! Best-effort field extraction from free text
//!
//! Runs once per incoming message, independent of dialogue state, so a
//! single turn like "I'm John, call me at 555-123-4567 tomorrow" can fill
//! several fields at once. Every value is a candidate: the form engine
//! merges them into unset fields only. Within each field the first
//! matching pattern wins; no disambiguation is attempted.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dates::resolve_date;
use crate::validators::{normalize_phone, valid_name, valid_phone};

/// Candidate field values found in one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// ISO `YYYY-MM-DD`
    pub appointment_date: Option<String>,
    /// 24-hour `HH:MM`
    pub appointment_time: Option<String>,
}

static EMAIL_SCAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}")
        .expect("email scan pattern compiles")
});

static PHONE_SCAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d[\d\s().\-]{5,18}\d").expect("phone scan pattern compiles")
});

/// Date and clock fragments that would otherwise look like digit groups.
static DIGIT_NOISE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}|\d{1,2}:\d{2}|\d{1,2}/\d{1,2}/\d{4}")
        .expect("digit noise pattern compiles")
});

static SELF_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:my name is|i am|i'm|this is|call me)\s+([A-Za-z][A-Za-z'\-]*(?:\s+[A-Za-z][A-Za-z'\-]*){0,3})",
    )
    .expect("self reference pattern compiles")
});

static LEADING_CAPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z][a-z'\-]+(?:\s+[A-Z][a-z'\-]+){1,3})")
        .expect("leading caps pattern compiles")
});

static TIME_12H_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})\s*([ap])\.?m\.?\b").expect("12h time pattern compiles")
});

static TIME_12H_BARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*([ap])\.?m\.?\b").expect("bare 12h time pattern compiles")
});

static TIME_24H_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("24h time pattern compiles"));

/// Words that can trail a self-reference phrase without being part of the
/// name ("call me back", "call me at ...").
const NAME_STOPWORDS: &[&str] = &[
    "back", "me", "at", "on", "in", "to", "my", "is", "a", "an", "the", "and", "or", "you",
    "your", "now", "soon", "later", "asap", "please", "today", "tomorrow", "yes", "no", "ok",
    "okay", "hello", "hi", "hey", "thanks", "thank", "what", "who", "when", "where", "why",
    "how", "can", "could", "would", "should", "next", "this", "that", "it",
];

fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    NAME_STOPWORDS.iter().any(|w| *w == lower)
}

/// Keep candidate words up to the first stopword.
fn clean_name_candidate(candidate: &str) -> Option<String> {
    let words: Vec<&str> = candidate
        .split_whitespace()
        .take_while(|w| !is_stopword(w))
        .collect();
    if words.is_empty() {
        return None;
    }
    let name = words.join(" ");
    valid_name(&name).then_some(name)
}

/// Stateless extractor over the compiled pattern tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every recognizable field from one message.
    pub fn extract(&self, message: &str, today: NaiveDate) -> ExtractedFields {
        ExtractedFields {
            name: self.extract_name(message),
            phone: self.extract_phone(message),
            email: self.extract_email(message),
            appointment_date: resolve_date(message, today).map(|d| d.format("%Y-%m-%d").to_string()),
            appointment_time: self.extract_time(message),
        }
    }

    fn extract_email(&self, message: &str) -> Option<String> {
        EMAIL_SCAN_RE.find(message).map(|m| m.as_str().to_string())
    }

    fn extract_phone(&self, message: &str) -> Option<String> {
        // Dates and clock times are digit groups too; blank them out first.
        let scrubbed = DIGIT_NOISE_RE.replace_all(message, " ");
        PHONE_SCAN_RE
            .find_iter(&scrubbed)
            .map(|m| normalize_phone(m.as_str()))
            .find(|candidate| valid_phone(candidate))
    }

    fn extract_name(&self, message: &str) -> Option<String> {
        // A message can hold several self-references ("call me back, I'm
        // John"); take the first that survives cleaning.
        for caps in SELF_REF_RE.captures_iter(message) {
            if let Some(name) = clean_name_candidate(&caps[1]) {
                return Some(name);
            }
        }
        if let Some(caps) = LEADING_CAPS_RE.captures(message.trim()) {
            let candidate = &caps[1];
            if candidate.split_whitespace().any(is_stopword) {
                return None;
            }
            return clean_name_candidate(candidate);
        }
        None
    }

    fn extract_time(&self, message: &str) -> Option<String> {
        if let Some(caps) = TIME_12H_RE.captures(message) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            return convert_12h(hour, minute, &caps[3]);
        }
        if let Some(caps) = TIME_12H_BARE_RE.captures(message) {
            let hour: u32 = caps[1].parse().ok()?;
            return convert_12h(hour, 0, &caps[2]);
        }
        if let Some(caps) = TIME_24H_RE.captures(message) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            if hour <= 23 && minute <= 59 {
                return Some(format!("{:02}:{:02}", hour, minute));
            }
        }
        None
    }
}

/// 12-hour to 24-hour conversion: pm adds 12 except at 12, and 12 am is
/// midnight.
fn convert_12h(hour: u32, minute: u32, meridiem: &str) -> Option<String> {
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let pm = meridiem.eq_ignore_ascii_case("p");
    let hour24 = match (pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };
    Some(format!("{:02}:{:02}", hour24, minute))
}
