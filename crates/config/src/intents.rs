//! Intent keyword configuration
//!
//! The router and the idle-state dispatch use plain case-insensitive
//! substring matching over these keyword sets. No generalized intent
//! classification happens here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Keyword sets for routing and confirmation handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentsConfig {
    /// Phrases that signal a callback/appointment request; any single
    /// substring match suffices
    #[serde(default = "d_appointment_keywords")]
    pub appointment_keywords: Vec<String>,

    /// Tokens accepted as a positive confirmation
    #[serde(default = "d_affirmative")]
    pub affirmative_tokens: Vec<String>,

    /// Tokens accepted as a negative confirmation
    #[serde(default = "d_negative")]
    pub negative_tokens: Vec<String>,
}

fn d_appointment_keywords() -> Vec<String> {
    [
        "call me",
        "call back",
        "callback",
        "phone me",
        "ring me",
        "book appointment",
        "schedule appointment",
        "make appointment",
        "meet",
        "consultation",
        "discuss",
        "talk to someone",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn d_affirmative() -> Vec<String> {
    ["yes", "y", "confirm", "correct", "ok", "okay"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn d_negative() -> Vec<String> {
    ["no", "n", "incorrect", "wrong"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for IntentsConfig {
    fn default() -> Self {
        Self {
            appointment_keywords: d_appointment_keywords(),
            affirmative_tokens: d_affirmative(),
            negative_tokens: d_negative(),
        }
    }
}

impl IntentsConfig {
    /// Load from a YAML file; fields absent from the file keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
