//! Prompt template configuration
//!
//! Every user-visible line the form engine emits comes from here, so a
//! deployment can reword the dialogue without touching code. Templates use
//! `{placeholder}` interpolation; see [`PromptsConfig::render`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Dialogue texts for the booking form, keyed by situation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Reply in the idle state when no appointment intent is detected
    #[serde(default = "d_idle_offer")]
    pub idle_offer: String,

    /// First question after an appointment intent is detected
    #[serde(default = "d_ask_name")]
    pub ask_name: String,
    /// Interpolates `{name}`
    #[serde(default = "d_ask_phone")]
    pub ask_phone: String,
    #[serde(default = "d_ask_email")]
    pub ask_email: String,
    #[serde(default = "d_ask_date")]
    pub ask_date: String,
    /// Interpolates `{date}`
    #[serde(default = "d_ask_time")]
    pub ask_time: String,
    #[serde(default = "d_ask_reason")]
    pub ask_reason: String,

    /// Re-ask prompts after a failed validation
    #[serde(default = "d_invalid_name")]
    pub invalid_name: String,
    #[serde(default = "d_invalid_phone")]
    pub invalid_phone: String,
    #[serde(default = "d_invalid_email")]
    pub invalid_email: String,
    #[serde(default = "d_invalid_date")]
    pub invalid_date: String,
    #[serde(default = "d_invalid_time")]
    pub invalid_time: String,
    #[serde(default = "d_invalid_reason")]
    pub invalid_reason: String,

    /// Confirmation recap; interpolates `{name}`, `{phone}`, `{email}`,
    /// `{date}`, `{time}`, `{reason}` (date and time already humanized)
    #[serde(default = "d_confirm_summary")]
    pub confirm_summary: String,
    /// Re-ask when a confirming reply is neither yes nor no
    #[serde(default = "d_confirm_reask")]
    pub confirm_reask: String,
    /// Final message; interpolates `{name}`, `{phone}`, `{email}`
    #[serde(default = "d_completed")]
    pub completed: String,

    /// Abort message when the retry budget is exhausted
    #[serde(default = "d_abort")]
    pub abort: String,
    /// Emitted when the appointment log cannot be written
    #[serde(default = "d_booking_failed")]
    pub booking_failed: String,

    /// Asked after a negative confirmation
    #[serde(default = "d_edit_ask")]
    pub edit_ask: String,
    /// Re-ask when the field to change cannot be recognized
    #[serde(default = "d_edit_unknown")]
    pub edit_unknown: String,
}

fn d_idle_offer() -> String {
    "I can answer questions about your documents, or book an appointment for you. \
     Just say something like \"call me back\" whenever you'd like us to get in touch."
        .into()
}

fn d_ask_name() -> String {
    "I'd be happy to set up an appointment. Let's start with some details. \
     What's your full name?"
        .into()
}

fn d_ask_phone() -> String {
    "Great, {name}! What phone number can we reach you at? \
     (include the country code if international)"
        .into()
}

fn d_ask_email() -> String {
    "Perfect. And your email address?".into()
}

fn d_ask_date() -> String {
    "When would you like the appointment? You can say things like \
     \"tomorrow\", \"next Monday\" or \"2024-12-25\"."
        .into()
}

fn d_ask_time() -> String {
    "Got it - {date}. What time works for you? For example \"2:30 pm\" or \"14:00\".".into()
}

fn d_ask_reason() -> String {
    "Almost done. What would you like to discuss?".into()
}

fn d_invalid_name() -> String {
    "That doesn't look like a name I can use. Please enter 2-50 characters, \
     letters, spaces, apostrophes and hyphens only."
        .into()
}

fn d_invalid_phone() -> String {
    "That phone number doesn't look right. Please enter 7-15 digits, \
     optionally starting with +."
        .into()
}

fn d_invalid_email() -> String {
    "That doesn't look like a valid email address. Please try again.".into()
}

fn d_invalid_date() -> String {
    "I couldn't work out that date, or it's already in the past. Try \
     \"tomorrow\", \"next Friday\" or a date like \"2024-12-25\"."
        .into()
}

fn d_invalid_time() -> String {
    "I couldn't work out that time. Try something like \"2:30 pm\" or \"14:00\".".into()
}

fn d_invalid_reason() -> String {
    "Please tell me briefly what the appointment is about.".into()
}

fn d_confirm_summary() -> String {
    "Here's what I have:\n\
     - Name: {name}\n\
     - Phone: {phone}\n\
     - Email: {email}\n\
     - Date: {date}\n\
     - Time: {time}\n\
     - Reason: {reason}\n\
     Shall I book it? (yes/no)"
        .into()
}

fn d_confirm_reask() -> String {
    "Please reply \"yes\" to confirm the appointment, or \"no\" to change something.".into()
}

fn d_completed() -> String {
    "You're all set, {name}! We'll contact you at {phone} or {email} to \
     confirm. Anything else I can help with?"
        .into()
}

fn d_abort() -> String {
    "I'm having trouble with that, so let's start over. Say \"call me back\" \
     whenever you'd like to try booking again."
        .into()
}

fn d_booking_failed() -> String {
    "Sorry - I couldn't save your booking just now. Your details are still \
     here; please say \"yes\" to try again."
        .into()
}

fn d_edit_ask() -> String {
    "No problem. Which detail should we change - name, phone, email, date, \
     time or reason?"
        .into()
}

fn d_edit_unknown() -> String {
    "I didn't catch which detail to change. You can say name, phone, email, \
     date, time or reason."
        .into()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            idle_offer: d_idle_offer(),
            ask_name: d_ask_name(),
            ask_phone: d_ask_phone(),
            ask_email: d_ask_email(),
            ask_date: d_ask_date(),
            ask_time: d_ask_time(),
            ask_reason: d_ask_reason(),
            invalid_name: d_invalid_name(),
            invalid_phone: d_invalid_phone(),
            invalid_email: d_invalid_email(),
            invalid_date: d_invalid_date(),
            invalid_time: d_invalid_time(),
            invalid_reason: d_invalid_reason(),
            confirm_summary: d_confirm_summary(),
            confirm_reask: d_confirm_reask(),
            completed: d_completed(),
            abort: d_abort(),
            booking_failed: d_booking_failed(),
            edit_ask: d_edit_ask(),
            edit_unknown: d_edit_unknown(),
        }
    }
}

impl PromptsConfig {
    /// Load from a YAML file; fields absent from the file keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Substitute `{key}` placeholders in a template.
    pub fn render(template: &str, values: &[(&str, &str)]) -> String {
        let mut out = template.to_string();
        for (key, value) in values {
            out = out.replace(&format!("{{{}}}", key), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_interpolation() {
        let out = PromptsConfig::render("Great, {name}! Call {phone}.", &[
            ("name", "Jane"),
            ("phone", "+14155552671"),
        ]);
        assert_eq!(out, "Great, Jane! Call +14155552671.");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "ask_name: \"What is your name?\"\n";
        let prompts: PromptsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(prompts.ask_name, "What is your name?");
        assert_eq!(prompts.invalid_email, PromptsConfig::default().invalid_email);
    }
}
