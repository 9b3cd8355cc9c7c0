//! Gemini reasoning client

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{ReasoningReply, Reasoner, parse_reply, prompt};
use crate::config::ReasoningConfig;
use crate::convo::dates::local_today;
use crate::convo::transcript::{Speaker, Turn};
use crate::{Error, Result};

/// Request body for the `generateContent` API
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

/// Response body from the `generateContent` API
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timezone: FixedOffset,
}

impl GeminiClient {
    /// Create a new reasoning client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be
    /// built
    pub fn new(api_key: String, config: &ReasoningConfig, timezone: FixedOffset) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "Gemini API key required for reasoning".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone,
        })
    }

    fn request_body(&self, window: &[Turn]) -> GenerateRequest {
        let today = local_today(self.timezone);
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let tz_label = self.timezone.to_string();

        let contents = window
            .iter()
            .map(|turn| Content {
                role: Some(match turn.speaker {
                    Speaker::User => "user",
                    Speaker::Assistant => "model",
                }),
                parts: vec![Part {
                    text: turn.text.clone(),
                }],
            })
            .collect();

        GenerateRequest {
            contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: prompt::build_system_instructions(today, tomorrow, &tz_label),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[async_trait]
impl Reasoner for GeminiClient {
    async fn reply(&self, window: &[Turn]) -> Result<ReasoningReply> {
        tracing::debug!(turns = window.len(), model = %self.model, "requesting reasoning reply");

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(window))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "reasoning request failed");
                Error::Reasoning(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "reasoning API error");
            return Err(Error::Reasoning(format!(
                "Gemini API error {status}: {body}"
            )));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse reasoning response");
            Error::Reasoning(e.to_string())
        })?;

        let raw: String = result
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let reply = parse_reply(&raw);
        tracing::info!(
            reply_chars = reply.text.len(),
            task_detected = reply.task.is_some(),
            "reasoning reply received"
        );
        Ok(reply)
    }
}
