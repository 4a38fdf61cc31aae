//! Chatdesk server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chatdesk_agent::{DialogueRouter, SessionManager};
use chatdesk_config::{load_settings, IntentsConfig, PromptsConfig, Settings};
use chatdesk_core::SystemClock;
use chatdesk_persistence::JsonlAppointmentStore;
use chatdesk_server::{create_router, AppState, UnconfiguredQa};
use chatdesk_text_processing::RegexEmailChecker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("CHATDESK_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing is not initialized yet
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(
        environment = env.as_deref().unwrap_or("default"),
        "Starting chatdesk server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let prompts = Arc::new(load_prompts(&settings));
    let intents = Arc::new(load_intents(&settings));

    let store = Arc::new(JsonlAppointmentStore::new(&settings.agent.appointment_log));
    tracing::info!(path = %store.path().display(), "Appointment log opened");

    let sessions = Arc::new(SessionManager::new(
        store.clone(),
        Arc::new(RegexEmailChecker),
        Arc::new(SystemClock),
        prompts,
        intents,
        settings.agent.max_retries,
    ));
    let router = Arc::new(DialogueRouter::new(Arc::new(UnconfiguredQa)));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(Arc::new(settings), sessions, store, router);
    let app = create_router(state);

    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_prompts(settings: &Settings) -> PromptsConfig {
    match settings.agent.prompts_path.as_deref() {
        Some(path) => match PromptsConfig::load(path) {
            Ok(prompts) => prompts,
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to load prompts, using defaults");
                PromptsConfig::default()
            }
        },
        None => PromptsConfig::default(),
    }
}

fn load_intents(settings: &Settings) -> IntentsConfig {
    match settings.agent.intents_path.as_deref() {
        Some(path) => match IntentsConfig::load(path) {
            Ok(intents) => intents,
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to load intents, using defaults");
                IntentsConfig::default()
            }
        },
        None => IntentsConfig::default(),
    }
}
