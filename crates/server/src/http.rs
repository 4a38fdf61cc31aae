//! HTTP endpoints
//!
//! REST surface for the booking agent.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use chatdesk_agent::{route, Route};
use chatdesk_core::{AppointmentRecord, FormState};

use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/reset", post(reset_session))
        .route("/api/chat/:session_id", post(chat))
        .route("/api/appointments", get(list_appointments))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// Disabled CORS means a permissive layer for development; enabled with no
/// valid origins falls back to localhost.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allowed = if parsed.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        match "http://localhost:3000".parse::<HeaderValue>() {
            Ok(value) => vec![value],
            Err(_) => return CorsLayer::new(),
        }
    } else {
        parsed
    };

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session_id = state.sessions.create();
    (StatusCode::CREATED, Json(SessionCreated { session_id }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let form = state
        .sessions
        .get(&id)
        .ok_or_else(|| ServerError::SessionNotFound(id.to_string()))?;

    let guard = form.lock();
    Ok(Json(serde_json::json!({
        "session_id": id,
        "state": guard.state().as_str(),
        "turn_count": guard.session().history.len(),
    })))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.sessions.remove(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn reset_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.sessions.reset(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    route: Route,
    state: FormState,
    #[serde(skip_serializing_if = "Option::is_none")]
    appointment: Option<AppointmentRecord>,
}

/// Chat endpoint. Form turns run under the session lock; QA turns await
/// the collaborator with the lock released.
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    let form = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ServerError::SessionNotFound(session_id.to_string()))?;

    let keywords = &state.sessions.intents().appointment_keywords;
    let decision = {
        let guard = form.lock();
        route(&request.message, guard.state(), keywords)
    };

    let response = match decision {
        Route::Form => {
            let reply = form.lock().process_message(&request.message);
            ChatResponse {
                response: reply.response,
                route: Route::Form,
                state: reply.state,
                appointment: reply.appointment,
            }
        }
        Route::Qa => {
            let answer = state.router.answer_qa(&request.message).await;
            let current = form.lock().state();
            ChatResponse {
                response: answer,
                route: Route::Qa,
                state: current,
                appointment: None,
            }
        }
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct AppointmentsQuery {
    /// Substring match over name, email or phone
    q: Option<String>,
    /// Exact ISO date filter
    date: Option<String>,
}

async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let records = match (&query.q, &query.date) {
        (Some(term), None) => state.store.find_by_contact(term)?,
        (None, Some(date)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                ServerError::InvalidRequest(format!("invalid date filter: {}", date))
            })?;
            state.store.list_for_date(date)?
        }
        (Some(term), Some(date)) => {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                ServerError::InvalidRequest(format!("invalid date filter: {}", date))
            })?;
            let iso = date.format("%Y-%m-%d").to_string();
            state
                .store
                .find_by_contact(term)?
                .into_iter()
                .filter(|r| r.appointment_date == iso)
                .collect()
        }
        (None, None) => state.store.scan(&|_| true)?,
    };

    Ok(Json(serde_json::json!({
        "count": records.len(),
        "appointments": records,
    })))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
