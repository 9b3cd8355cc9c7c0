//! Task automation webhook integration
//!
//! Client for dispatching confirmed tasks to an external workflow engine
//! (e.g. an n8n webhook) over HTTP.

pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{Error as CrateError, Result};

/// Payload POSTed to the automation webhook
///
/// `due_date` is a bare ISO-8601 date; the receiving workflow interprets the
/// time as midnight UTC.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub title: String,
    pub due_date: NaiveDate,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

impl TaskPayload {
    /// Build a payload from confirmed task fields
    #[must_use]
    pub fn new(title: impl Into<String>, due_date: NaiveDate, notes: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date,
            notes: notes.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A failed dispatch attempt
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The webhook answered with a non-2xx status
    #[error("webhook returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
        /// Parsed `Retry-After` header, if the webhook sent one
        retry_after: Option<Duration>,
    },

    /// The request never completed (connect failure, timeout, DNS)
    #[error("webhook request failed: {0}")]
    Network(String),
}

impl DispatchError {
    /// Whether this failure is worth another attempt
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Status { status, .. } => retry::is_recoverable_status(*status),
            Self::Network(_) => true,
        }
    }

    /// Server-requested wait before the next attempt, if any
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            Self::Network(_) => None,
        }
    }
}

/// Sink for confirmed task payloads
///
/// One call is one dispatch attempt; the conversation controller owns the
/// retry loop so the attempt bound stays visible in one place.
#[async_trait]
pub trait TaskDispatcher: Send + Sync {
    /// Attempt to deliver the payload once
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] describing the failed attempt
    async fn dispatch(&self, payload: &TaskPayload) -> std::result::Result<(), DispatchError>;
}

/// Dispatches tasks to an automation webhook
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// Create a new webhook client
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(CrateError::Config(
                "automation webhook URL required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CrateError::Http)?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl TaskDispatcher for WebhookClient {
    async fn dispatch(&self, payload: &TaskPayload) -> std::result::Result<(), DispatchError> {
        tracing::debug!(title = %payload.title, due = %payload.due_date, "dispatching task");

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DispatchError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(title = %payload.title, status = %status, "task dispatched");
            return Ok(());
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        tracing::warn!(status = %status, body = %body, "webhook rejected task");
        Err(DispatchError::Status {
            status: status.as_u16(),
            body,
            retry_after,
        })
    }
}
