//! Configuration management for the Attache gateway
//!
//! Defaults are overlaid by the TOML config file, which is in turn overlaid
//! by environment variables.

pub mod file;

use chrono::{FixedOffset, Offset, Utc};

use crate::{Error, Result};

/// Default reasoning model
const DEFAULT_REASONING_MODEL: &str = "gemini-2.0-flash";

/// Default reasoning API base URL
const DEFAULT_REASONING_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Attache gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// UTC offset for interpreting relative dates ("today", "tomorrow")
    pub timezone: FixedOffset,

    /// Reasoning endpoint configuration
    pub reasoning: ReasoningConfig,

    /// Task automation webhook configuration
    pub automation: AutomationConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Reasoning endpoint configuration
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    /// Model identifier for chat replies and task detection
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Number of recent turns sent as context
    pub window_turns: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_REASONING_MODEL.to_string(),
            base_url: DEFAULT_REASONING_BASE_URL.to_string(),
            timeout_secs: 30,
            window_turns: 12,
        }
    }
}

/// Task automation webhook configuration
#[derive(Debug, Clone)]
pub struct AutomationConfig {
    /// Webhook URL to POST confirmed tasks to; `None` disables dispatch
    pub webhook_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Total dispatch attempts before the intent is rejected
    pub max_attempts: u32,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
            max_attempts: 3,
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input/output endpoints
    pub enabled: bool,

    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: String,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: String,

    /// TTS model (e.g. "tts-1", "eleven_monolingual_v1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stt_provider: "whisper".to_string(),
            stt_model: "whisper-1".to_string(),
            tts_provider: "openai".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Gemini API key (reasoning)
    pub gemini: Option<String>,

    /// `OpenAI` API key (Whisper STT and TTS)
    pub openai: Option<String>,

    /// Deepgram API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl Config {
    /// Load configuration: defaults, overlaid by the config file, overlaid by
    /// environment variables
    ///
    /// # Errors
    ///
    /// Returns error if the configured timezone offset is malformed
    pub fn load() -> Result<Self> {
        let file = file::load_config_file();

        let tz_raw = std::env::var("ATTACHE_TZ_OFFSET")
            .ok()
            .or(file.timezone)
            .unwrap_or_else(|| "UTC".to_string());
        let timezone = parse_utc_offset(&tz_raw)?;

        let mut reasoning = ReasoningConfig::default();
        if let Some(model) = file.reasoning.model {
            reasoning.model = model;
        }
        if let Some(base_url) = file.reasoning.base_url {
            reasoning.base_url = base_url;
        }
        if let Some(secs) = file.reasoning.timeout_secs {
            reasoning.timeout_secs = secs;
        }
        if let Some(turns) = file.reasoning.window_turns {
            reasoning.window_turns = turns;
        }

        let defaults = AutomationConfig::default();
        let automation = AutomationConfig {
            webhook_url: env_or("TASKS_WEBHOOK_URL", file.automation.webhook_url),
            timeout_secs: file
                .automation
                .timeout_secs
                .unwrap_or(defaults.timeout_secs),
            max_attempts: file
                .automation
                .max_attempts
                .map_or(defaults.max_attempts, |attempts| attempts.max(1)),
        };

        let mut voice = VoiceConfig::default();
        if let Some(enabled) = file.voice.enabled {
            voice.enabled = enabled;
        }
        if let Some(provider) = file.voice.stt_provider {
            voice.stt_provider = provider;
        }
        if let Some(model) = file.voice.stt_model {
            voice.stt_model = model;
        }
        if let Some(provider) = file.voice.tts_provider {
            voice.tts_provider = provider;
        }
        if let Some(model) = file.voice.tts_model {
            voice.tts_model = model;
        }
        if let Some(tts_voice) = file.voice.tts_voice {
            voice.tts_voice = tts_voice;
        }
        if let Some(speed) = file.voice.tts_speed {
            voice.tts_speed = speed;
        }

        let api_keys = ApiKeys {
            gemini: env_or("GEMINI_API_KEY", file.api_keys.gemini),
            openai: env_or("OPENAI_API_KEY", file.api_keys.openai),
            deepgram: env_or("DEEPGRAM_API_KEY", file.api_keys.deepgram),
            elevenlabs: env_or("ELEVENLABS_API_KEY", file.api_keys.elevenlabs),
        };

        Ok(Self {
            timezone,
            reasoning,
            automation,
            voice,
            api_keys,
        })
    }
}

/// Read an environment variable, falling back to a config-file value
fn env_or(name: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .or(fallback)
}

/// Parse a UTC offset string: "UTC", "Z", or "[+-]HH:MM"
///
/// # Errors
///
/// Returns `Error::Config` if the string is not a valid offset
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(Utc.fix());
    }

    let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
        (1_i32, rest)
    } else if let Some(rest) = trimmed.strip_prefix('-') {
        (-1_i32, rest)
    } else {
        return Err(Error::Config(format!(
            "invalid timezone offset '{raw}': expected UTC or [+-]HH:MM"
        )));
    };

    let (hh, mm) = rest.split_once(':').ok_or_else(|| {
        Error::Config(format!(
            "invalid timezone offset '{raw}': expected UTC or [+-]HH:MM"
        ))
    })?;

    let hours: i32 = hh
        .parse()
        .map_err(|_| Error::Config(format!("invalid timezone offset hours in '{raw}'")))?;
    let minutes: i32 = mm
        .parse()
        .map_err(|_| Error::Config(format!("invalid timezone offset minutes in '{raw}'")))?;

    if hours > 23 || minutes > 59 {
        return Err(Error::Config(format!("timezone offset '{raw}' out of range")));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| Error::Config(format!("timezone offset '{raw}' out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utc_aliases() {
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("utc").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn parses_positive_offset() {
        let off = parse_utc_offset("+05:30").unwrap();
        assert_eq!(off.local_minus_utc(), 5 * 3600 + 30 * 60);
    }

    #[test]
    fn parses_negative_offset() {
        let off = parse_utc_offset("-08:00").unwrap();
        assert_eq!(off.local_minus_utc(), -8 * 3600);
    }

    #[test]
    fn rejects_malformed_offsets() {
        assert!(parse_utc_offset("0530").is_err());
        assert!(parse_utc_offset("+5").is_err());
        assert!(parse_utc_offset("+24:00").is_err());
        assert!(parse_utc_offset("+05:61").is_err());
        assert!(parse_utc_offset("Kolkata").is_err());
    }

    #[test]
    fn default_automation_bounds() {
        let automation = AutomationConfig::default();
        assert_eq!(automation.max_attempts, 3);
        assert!(automation.webhook_url.is_none());
    }
}
