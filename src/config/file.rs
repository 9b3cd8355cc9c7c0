//! TOML configuration file loading
//!
//! Supports `~/.config/attache/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AttacheConfigFile {
    /// UTC offset for interpreting relative dates (e.g. "+05:30", "UTC")
    #[serde(default)]
    pub timezone: Option<String>,

    /// Reasoning endpoint configuration
    #[serde(default)]
    pub reasoning: ReasoningFileConfig,

    /// Task automation webhook configuration
    #[serde(default)]
    pub automation: AutomationFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Reasoning endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct ReasoningFileConfig {
    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: Option<String>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Number of recent turns sent as context
    pub window_turns: Option<usize>,
}

/// Task automation webhook configuration
#[derive(Debug, Default, Deserialize)]
pub struct AutomationFileConfig {
    /// Webhook URL to POST confirmed tasks to
    pub webhook_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Total dispatch attempts before giving up
    pub max_attempts: Option<u32>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub gemini: Option<String>,
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `AttacheConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> AttacheConfigFile {
    let Some(path) = config_file_path() else {
        return AttacheConfigFile::default();
    };

    if !path.exists() {
        return AttacheConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AttacheConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AttacheConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/attache/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("attache").join("config.toml"))
}
