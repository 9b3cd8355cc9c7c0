//! Reasoning client: chat replies with optional task detection
//!
//! The external endpoint is asked to answer conversationally AND to flag
//! when a task should be created. The reply contract is strict JSON; parsing
//! here is lenient at the transport layer (malformed output degrades to a
//! plain-text reply) and strict at the field layer (a draft without a title
//! is discarded).

mod gemini;
pub(crate) mod prompt;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;
use crate::convo::transcript::Turn;

/// A reply from the reasoning endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningReply {
    /// Conversational assistant text
    pub text: String,
    /// Candidate task, when the endpoint judged one appropriate
    pub task: Option<TaskDraft>,
}

impl ReasoningReply {
    /// A reply carrying no task
    #[must_use]
    pub const fn plain(text: String) -> Self {
        Self { text, task: None }
    }
}

/// A candidate task extracted from a reasoning reply, prior to validation
/// of its due date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    /// Raw due-date text as the endpoint produced it ("2026-08-07",
    /// "tomorrow", or empty when the date was unclear)
    pub due: String,
    pub notes: String,
}

/// Produces assistant replies for a transcript window
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Produce a reply for the given window, oldest turn first
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is unreachable, times out, or answers
    /// with a non-success status
    async fn reply(&self, window: &[Turn]) -> Result<ReasoningReply>;
}

/// Wire shape of the strict-JSON reply contract
#[derive(Debug, Default, Deserialize)]
struct WireReply {
    #[serde(default)]
    response: String,
    #[serde(default)]
    task: WireTask,
}

#[derive(Debug, Default, Deserialize)]
struct WireTask {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    title: String,
    #[serde(default)]
    due: String,
    #[serde(default)]
    notes: String,
}

/// Parse raw endpoint output into a tagged reply
///
/// Tolerates minor formatting drift: if the whole body is not valid JSON,
/// the first `{`..last `}` slice is tried before falling back to treating
/// the raw text as plain conversation.
pub(crate) fn parse_reply(raw: &str) -> ReasoningReply {
    let trimmed = raw.trim();

    let wire = serde_json::from_str::<WireReply>(trimmed)
        .ok()
        .or_else(|| {
            let start = trimmed.find('{')?;
            let end = trimmed.rfind('}')?;
            serde_json::from_str::<WireReply>(trimmed.get(start..=end)?).ok()
        });

    let Some(wire) = wire else {
        return ReasoningReply::plain(trimmed.to_string());
    };

    let title = wire.task.title.trim();
    let task = (wire.task.enabled && !title.is_empty()).then(|| TaskDraft {
        title: title.to_string(),
        due: wire.task.due.trim().to_string(),
        notes: wire.task.notes.trim().to_string(),
    });

    ReasoningReply {
        text: wire.response.trim().to_string(),
        task,
    }
}
