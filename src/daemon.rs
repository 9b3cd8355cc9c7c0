//! Daemon - the main gateway service
//!
//! Wires configuration into the reasoning, automation, and voice clients,
//! builds the API state, and serves the HTTP surface until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::api::{self, ApiState};
use crate::automation::{TaskDispatcher, WebhookClient};
use crate::convo::{Controller, ControllerConfig};
use crate::reasoning::{GeminiClient, Reasoner};
use crate::voice::{SpeechToText, TextToSpeech};
use crate::{Config, Error, Result};

/// Request timeout for the STT/TTS provider APIs
pub const MEDIA_TIMEOUT_SECS: u64 = 30;

/// The Attache daemon - orchestrates chat, voice, and task automation
pub struct Daemon {
    config: Config,
    port: u16,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config, port: u16) -> Self {
        Self { config, port }
    }

    /// Initialize the reasoning client
    ///
    /// Returns `None` when no API key is configured; the gateway then runs
    /// in setup mode with chat unavailable.
    fn init_reasoner(&self) -> Option<Arc<dyn Reasoner>> {
        let Some(key) = self.config.api_keys.gemini.clone() else {
            tracing::warn!("GEMINI_API_KEY not set - running in setup mode, chat unavailable");
            return None;
        };

        match GeminiClient::new(key, &self.config.reasoning, self.config.timezone) {
            Ok(client) => {
                tracing::info!(
                    model = %self.config.reasoning.model,
                    window_turns = self.config.reasoning.window_turns,
                    "reasoning client initialized"
                );
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize reasoning client");
                None
            }
        }
    }

    /// Initialize the automation webhook client
    fn init_dispatcher(&self) -> Option<Arc<dyn TaskDispatcher>> {
        let url = self.config.automation.webhook_url.as_ref()?;
        let timeout = Duration::from_secs(self.config.automation.timeout_secs);

        match WebhookClient::new(url.clone(), timeout) {
            Ok(client) => {
                tracing::info!(url = %url, "task automation webhook configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize webhook client");
                None
            }
        }
    }

    /// Initialize the transcription adapter
    fn init_stt(&self) -> Option<Arc<SpeechToText>> {
        if !self.config.voice.enabled {
            return None;
        }

        let timeout = Duration::from_secs(MEDIA_TIMEOUT_SECS);
        match SpeechToText::from_config(&self.config.voice, &self.config.api_keys, timeout) {
            Ok(stt) => {
                tracing::info!(
                    provider = %self.config.voice.stt_provider,
                    model = %self.config.voice.stt_model,
                    "STT adapter initialized"
                );
                Some(Arc::new(stt))
            }
            Err(e) => {
                tracing::warn!(error = %e, "STT unavailable");
                None
            }
        }
    }

    /// Initialize the synthesis adapter
    fn init_tts(&self) -> Option<Arc<TextToSpeech>> {
        if !self.config.voice.enabled {
            return None;
        }

        let timeout = Duration::from_secs(MEDIA_TIMEOUT_SECS);
        match TextToSpeech::from_config(&self.config.voice, &self.config.api_keys, timeout) {
            Ok(tts) => {
                tracing::info!(
                    provider = %self.config.voice.tts_provider,
                    voice = %self.config.voice.tts_voice,
                    "TTS adapter initialized"
                );
                Some(Arc::new(tts))
            }
            Err(e) => {
                tracing::warn!(error = %e, "TTS unavailable");
                None
            }
        }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot bind or the server fails
    pub async fn run(self) -> Result<()> {
        let reasoner = self.init_reasoner();
        let dispatcher = self.init_dispatcher();
        let automation_configured = dispatcher.is_some();

        let chat = reasoner.map(|reasoner| {
            let controller_config = ControllerConfig {
                window_turns: self.config.reasoning.window_turns,
                max_dispatch_attempts: self.config.automation.max_attempts,
                timezone: self.config.timezone,
                ..ControllerConfig::default()
            };
            Arc::new(Mutex::new(Controller::new(
                reasoner,
                dispatcher,
                controller_config,
            )))
        });

        let state = Arc::new(ApiState {
            chat,
            stt: self.init_stt(),
            tts: self.init_tts(),
            automation_configured,
        });

        let app = api::router(state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await.map_err(Error::Io)?;
        tracing::info!(%addr, "attache gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(Error::Io)?;

        tracing::info!("attache gateway stopped");
        Ok(())
    }
}

/// Resolve when a shutdown signal arrives
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
