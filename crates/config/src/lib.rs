//! Configuration management for the chatdesk agent
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`CHATDESK_` prefix)
//!
//! Dialogue texts live in their own serde structs (`PromptsConfig`,
//! `IntentsConfig`) whose `Default` impls carry the shipped English
//! wording, so the agent runs with no config files present.

pub mod intents;
pub mod prompts;
pub mod settings;

pub use intents::IntentsConfig;
pub use prompts::PromptsConfig;
pub use settings::{load_settings, AgentSettings, ServerConfig, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
