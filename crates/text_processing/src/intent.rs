//! Keyword intent matching and confirmation classification
//!
//! Deliberately simple: case-insensitive substring matching against
//! configured keyword sets, nothing statistical.

use chatdesk_core::FormField;

/// True if the message contains any appointment/callback keyword.
pub fn matches_appointment_intent(message: &str, keywords: &[String]) -> bool {
    let lower = message.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

/// Outcome of a yes/no classification at the confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmative,
    Negative,
    Other,
}

/// Classify a confirming reply against the configured token sets.
///
/// The whole trimmed message (minus trailing punctuation) must equal one
/// of the tokens; substring matching would turn "y" into a wildcard.
pub fn classify_confirmation(
    message: &str,
    affirmative: &[String],
    negative: &[String],
) -> Confirmation {
    let token = message
        .trim()
        .trim_end_matches(['.', '!', '?'])
        .to_lowercase();
    if affirmative.iter().any(|t| *t == token) {
        Confirmation::Affirmative
    } else if negative.iter().any(|t| *t == token) {
        Confirmation::Negative
    } else {
        Confirmation::Other
    }
}

/// Find which booking field a correction message refers to
/// ("change my email", "the phone number is wrong").
pub fn parse_field_mention(message: &str) -> Option<FormField> {
    let lower = message.to_lowercase();
    let mentions: &[(&str, FormField)] = &[
        ("name", FormField::Name),
        ("phone", FormField::Phone),
        ("number", FormField::Phone),
        ("email", FormField::Email),
        ("mail", FormField::Email),
        ("date", FormField::Date),
        ("day", FormField::Date),
        ("time", FormField::Time),
        ("reason", FormField::Reason),
        ("purpose", FormField::Reason),
    ];
    for (word, field) in mentions {
        if lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == *word)
        {
            return Some(*field);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // Subset of the shipped keyword set; the config crate owns the real one.
    fn keywords() -> Vec<String> {
        ["call me", "call back", "callback", "book appointment", "consultation", "discuss"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_appointment_intent_substring_match() {
        assert!(matches_appointment_intent("Can you CALL ME back?", &keywords()));
        assert!(matches_appointment_intent("i'd like a consultation", &keywords()));
        assert!(!matches_appointment_intent("what is machine learning?", &keywords()));
    }

    #[test]
    fn test_confirmation_exact_token() {
        let yes: Vec<String> = ["yes", "y", "okay"].iter().map(|s| s.to_string()).collect();
        let no: Vec<String> = ["no", "n", "wrong"].iter().map(|s| s.to_string()).collect();
        assert_eq!(classify_confirmation("Yes", &yes, &no), Confirmation::Affirmative);
        assert_eq!(classify_confirmation("okay!", &yes, &no), Confirmation::Affirmative);
        assert_eq!(classify_confirmation("no", &yes, &no), Confirmation::Negative);
        assert_eq!(classify_confirmation("yes please", &yes, &no), Confirmation::Other);
        assert_eq!(classify_confirmation("maybe", &yes, &no), Confirmation::Other);
    }

    #[test]
    fn test_field_mention() {
        assert_eq!(parse_field_mention("change my email"), Some(FormField::Email));
        assert_eq!(parse_field_mention("the phone number"), Some(FormField::Phone));
        assert_eq!(parse_field_mention("pick another day"), Some(FormField::Date));
        assert_eq!(parse_field_mention("everything is fine"), None);
    }
}
