//! Attache Gateway - voice and chat assistant gateway with task automation
//!
//! This library is a thin orchestration layer: speech recognition, speech
//! synthesis, and reasoning are delegated to external services, and task
//! automation goes to an external workflow webhook. The one stateful piece
//! is the per-session conversation controller and its intent confirmation
//! flow.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Chat Surface (browser)              │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                Attache Gateway                       │
//! │   STT/TTS adapters │ Conversation Controller         │
//! └──────┬─────────────┴──────┬──────────────┬──────────┘
//!        │                    │              │
//!   speech APIs        reasoning API    task webhook
//! ```

pub mod api;
pub mod automation;
pub mod config;
pub mod convo;
pub mod daemon;
pub mod error;
pub mod reasoning;
pub mod voice;

pub use config::Config;
pub use convo::{
    Controller, ControllerConfig, IntentKind, IntentStatus, Speaker, TaskIntent, Transcript, Turn,
};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use automation::{DispatchError, TaskDispatcher, TaskPayload, WebhookClient};
pub use automation::retry::RetryPolicy;
pub use reasoning::{GeminiClient, Reasoner, ReasoningReply, TaskDraft};
pub use voice::{SpeechToText, TextToSpeech};
