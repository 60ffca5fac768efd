//! # API Server
//!
//! axum router for the debate service. The router is built separately from the
//! listener so it can be served on an ephemeral port in tests.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Chat, personas, and speech endpoints; configurable CORS origins
//! - 1.0.0: Initial debate endpoint

use anyhow::Result;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

use crate::api::protocol::{
    ChatRequest, DebateRequest, DebateResponse, HealthResponse, InitiateDebateRequest,
    InitiateDebateResponse, PersonaSummary, SpeechRequest, StatusResponse,
};
use crate::core::{ApiError, Config};
use crate::features::debate::DualAgentOrchestrator;
use crate::features::personas::{PersonaId, PersonaRegistry};
use crate::features::speech::{SpeechResult, SpeechSynthesizer};

/// Shared, read-only handles for every request
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DualAgentOrchestrator>,
    pub personas: Arc<PersonaRegistry>,
    pub speech: Arc<SpeechSynthesizer>,
    /// Model id reported by the health check
    pub model: String,
}

pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/personas", get(list_personas))
        .route("/api/debate/initiate", post(initiate_debate))
        .route("/api/debate", post(debate))
        .route("/api/chat", post(chat))
        .route("/api/speech", post(speech))
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until the process exits
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let app = build_router(state, &config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("PolicyPulse API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Welcome to the PolicyPulse API!".to_string(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        speech_enabled: state.speech.is_enabled(),
        model: state.model.clone(),
    })
}

async fn list_personas(State(state): State<AppState>) -> Json<Vec<PersonaSummary>> {
    Json(
        state
            .personas
            .list()
            .into_iter()
            .map(PersonaSummary::from)
            .collect(),
    )
}

async fn initiate_debate(
    State(state): State<AppState>,
    Json(request): Json<InitiateDebateRequest>,
) -> Result<Json<InitiateDebateResponse>, ApiError> {
    if request.user_policy_prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("user_policy_prompt must not be empty".into()));
    }

    let debate_id = Uuid::new_v4();
    info!("[{debate_id}] Debate initiated");

    Ok(Json(InitiateDebateResponse {
        debate_id,
        agent_a_persona: state.personas.get(PersonaId::AgentA).name.clone(),
        agent_b_persona: state.personas.get(PersonaId::AgentB).name.clone(),
    }))
}

async fn debate(
    State(state): State<AppState>,
    Json(request): Json<DebateRequest>,
) -> Result<Json<DebateResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }

    let result = state
        .orchestrator
        .run_debate(&request.prompt, request.use_search)
        .await?;
    Ok(Json(result.into()))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<DebateResponse>, ApiError> {
    let result = state
        .orchestrator
        .run_chat(&request.messages, request.use_search)
        .await?;
    Ok(Json(result.into()))
}

async fn speech(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> Json<SpeechResult> {
    Json(
        state
            .speech
            .synthesize_request(&request.text, request.agent, request.voice_id.as_deref())
            .await,
    )
}
