//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Agent configuration
    #[serde(default)]
    pub agent: AgentSettings,

    /// Log filter directive (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_enabled: bool,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: false,
            cors_origins: Vec::new(),
        }
    }
}

/// Form engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Consecutive invalid attempts tolerated at one state before the
    /// session aborts back to idle
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Path of the append-only appointment log
    #[serde(default = "default_appointment_log")]
    pub appointment_log: String,

    /// Optional prompt overrides file
    #[serde(default)]
    pub prompts_path: Option<String>,

    /// Optional intent keyword overrides file
    #[serde(default)]
    pub intents_path: Option<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_appointment_log() -> String {
    "appointments.jsonl".to_string()
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            appointment_log: default_appointment_log(),
            prompts_path: None,
            intents_path: None,
        }
    }
}

/// Load settings from files and environment.
///
/// Priority: env vars > `config/{env}.yaml` > `config/default.yaml` > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if Path::new("config/default.yaml").exists() {
        builder = builder.add_source(File::with_name("config/default"));
    }

    if let Some(env_name) = env {
        let env_path = format!("config/{}", env_name);
        if Path::new(&format!("{}.yaml", env_path)).exists() {
            builder = builder.add_source(File::with_name(&env_path));
        }
    }

    let settings = builder
        .add_source(Environment::with_prefix("CHATDESK").separator("__"))
        .build()?
        .try_deserialize::<Settings>()?;

    if settings.agent.max_retries == 0 {
        return Err(ConfigError::InvalidValue(
            "agent.max_retries must be at least 1".to_string(),
        ));
    }

    Ok(settings)
}
