//! services/api/src/web/tts.rs
//!
//! Axum handlers for speech synthesis: generation plus the voice, preset
//! and status discovery endpoints.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;
use lectern_core::speech::MAX_REQUEST_CHARS;

/// The quality presets accepted by the generation endpoint, with the
/// trade-off each one makes.
const PRESETS: [(&str, &str); 4] = [
    ("ultrafast", "Lowest latency, lowest quality"),
    ("fast", "Low latency, good quality (default)"),
    ("standard", "Balanced latency and quality"),
    ("high_quality", "Highest quality, slowest"),
];

pub const DEFAULT_PRESET: &str = "fast";

fn default_voice() -> String {
    "alloy".to_string()
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for speech generation.
#[derive(Deserialize, ToSchema)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_preset")]
    pub preset: String,
}

#[derive(Serialize, ToSchema)]
pub struct VoicesResponse {
    pub voices: Vec<String>,
    pub default: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate speech audio for a piece of text.
///
/// Returns the complete utterance as a WAV stream. Repeated requests for
/// the same text, voice and preset are served from the audio cache.
#[utoipa::path(
    post,
    path = "/tts/generate",
    request_body = SpeechRequest,
    responses(
        (status = 200, description = "The synthesized WAV audio", content_type = "audio/wav"),
        (status = 400, description = "Empty or overlong text"),
        (status = 503, description = "No speech engine is available")
    )
)]
pub async fn generate_speech_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SpeechRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let artifact = app_state
        .pipeline
        .generate(&request.text, &request.voice, &request.preset)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"speech.wav\"".to_string(),
            ),
        ],
        artifact,
    ))
}

/// List the voices the active engine can speak with.
#[utoipa::path(
    get,
    path = "/tts/voices",
    responses(
        (status = 200, description = "Available voices", body = VoicesResponse)
    )
)]
pub async fn list_voices_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(VoicesResponse {
        voices: app_state.engine.voices(),
        default: app_state.config.tts_voice.clone(),
    }))
}

/// List the quality presets the generation endpoint accepts.
#[utoipa::path(
    get,
    path = "/tts/presets",
    responses(
        (status = 200, description = "Available presets")
    )
)]
pub async fn list_presets_handler() -> impl IntoResponse {
    let presets: Vec<_> = PRESETS
        .iter()
        .map(|(name, description)| json!({ "name": name, "description": description }))
        .collect();
    Json(json!({ "presets": presets, "default": DEFAULT_PRESET }))
}

/// Report the engine's current status.
#[utoipa::path(
    get,
    path = "/tts/status",
    responses(
        (status = 200, description = "Engine status")
    )
)]
pub async fn engine_status_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": app_state.engine.status(),
        "max_request_chars": MAX_REQUEST_CHARS,
    }))
}
