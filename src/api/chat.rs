//! Chat endpoint: one user turn in, one assistant turn out
//!
//! Voice input arrives as base64 WAV and is transcribed before the turn is
//! handled; the reply can optionally be synthesized back to base64 MP3.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Build chat router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .with_state(state)
}

/// One user turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Typed message text; takes precedence over audio when both are present
    #[serde(default)]
    pub text: Option<String>,

    /// Base64-encoded WAV clip to transcribe when no text was typed
    #[serde(default)]
    pub audio: Option<String>,

    /// Opaque reference to the source audio clip, recorded on the turn
    #[serde(default)]
    pub audio_ref: Option<String>,

    /// Synthesize the reply to speech
    #[serde(default)]
    pub speak: bool,
}

/// The resulting assistant turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Total turns recorded in the session transcript so far
    pub transcript_turns: usize,
    /// Base64-encoded MP3 of the reply, when `speak` was requested and TTS
    /// is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// Handle one user turn
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let controller = state
        .chat
        .as_ref()
        .ok_or(ChatError::NotConfigured("chat not configured (no reasoning API key)"))?;

    let typed = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let text = if let Some(typed) = typed {
        typed.to_string()
    } else if let Some(audio) = request.audio.as_deref() {
        let stt = state
            .stt
            .as_ref()
            .ok_or(ChatError::NotConfigured("voice input not configured (no STT provider)"))?;

        let bytes = BASE64
            .decode(audio)
            .map_err(|_| ChatError::BadRequest("audio is not valid base64"))?;

        stt.transcribe(&bytes)
            .await
            .map_err(|e| ChatError::TranscriptionFailed(e.to_string()))?
    } else {
        return Err(ChatError::BadRequest("either text or audio is required"));
    };

    let (reply, transcript_turns) = {
        let mut controller = controller.lock().await;
        let turn = controller.handle_user_turn(&text, request.audio_ref).await;
        (turn, controller.transcript().len())
    };

    // Synthesis failures degrade to a text-only reply
    let audio = if request.speak {
        match state.tts.as_ref() {
            Some(tts) => match tts.synthesize(&reply.text).await {
                Ok(bytes) => Some(BASE64.encode(bytes)),
                Err(e) => {
                    tracing::warn!(error = %e, "reply synthesis failed");
                    None
                }
            },
            None => None,
        }
    } else {
        None
    };

    Ok(Json(ChatResponse {
        reply: reply.text,
        transcript_turns,
        audio,
    }))
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    TranscriptionFailed(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::TranscriptionFailed(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "transcription_failed",
                msg,
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
