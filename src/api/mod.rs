//! HTTP API server for the Attache gateway
//!
//! The browser chat surface is an external collaborator; this module is the
//! contract it talks to.

pub mod chat;
pub mod health;
pub mod voice;

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::convo::Controller;
use crate::voice::{SpeechToText, TextToSpeech};

/// Shared state for API handlers
///
/// Each optional integration is `None` when its configuration is missing;
/// the corresponding endpoints answer `not_configured` instead of failing.
#[derive(Clone)]
pub struct ApiState {
    /// The single session's conversation controller. The mutex serializes
    /// turns: one user turn is fully handled before the next is accepted.
    pub chat: Option<Arc<Mutex<Controller>>>,

    /// Transcription adapter, when an STT provider is configured
    pub stt: Option<Arc<SpeechToText>>,

    /// Synthesis adapter, when a TTS provider is configured
    pub tts: Option<Arc<TextToSpeech>>,

    /// Whether an automation webhook is configured (readiness reporting)
    pub automation_configured: bool,
}

/// Build the full API router
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router(state.clone()))
        .merge(chat::router(state.clone()))
        .nest("/voice", voice::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
