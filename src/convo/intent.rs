//! Task intents and their confirmation state machine
//!
//! An intent is a candidate automation action extracted from a reasoning
//! reply. It is only ever dispatched after an explicit user confirmation:
//! `Pending -> Confirmed -> Dispatched`, or `Pending -> Rejected` when the
//! user cancels or dispatch retries are exhausted. No transition skips
//! `Pending`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result};

/// Confirmation lifecycle of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    /// Awaiting user confirmation
    Pending,
    /// User confirmed; dispatch in progress
    Confirmed,
    /// Webhook accepted the task (terminal)
    Dispatched,
    /// User cancelled or dispatch gave up (terminal)
    Rejected,
}

/// Kind of automation action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    CreateTask,
}

impl IntentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTask => "create_task",
        }
    }
}

/// A candidate automation action awaiting confirmation
#[derive(Debug, Clone)]
pub struct TaskIntent {
    pub id: String,
    pub kind: IntentKind,
    pub title: String,
    /// Resolved due date; `None` until the user supplies one
    pub due: Option<NaiveDate>,
    pub notes: String,
    status: IntentStatus,
}

impl TaskIntent {
    /// Create a pending task-creation intent
    #[must_use]
    pub fn create_task(
        title: impl Into<String>,
        due: Option<NaiveDate>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: IntentKind::CreateTask,
            title: title.into(),
            due,
            notes: notes.into(),
            status: IntentStatus::Pending,
        }
    }

    /// Current confirmation status
    #[must_use]
    pub const fn status(&self) -> IntentStatus {
        self.status
    }

    /// `Pending -> Confirmed`
    ///
    /// # Errors
    ///
    /// Returns error unless the intent is pending
    pub fn confirm(&mut self) -> Result<()> {
        self.transition(IntentStatus::Pending, IntentStatus::Confirmed)
    }

    /// `Confirmed -> Dispatched`
    ///
    /// # Errors
    ///
    /// Returns error unless the intent is confirmed
    pub fn mark_dispatched(&mut self) -> Result<()> {
        self.transition(IntentStatus::Confirmed, IntentStatus::Dispatched)
    }

    /// `Confirmed -> Pending`, after a failed dispatch attempt
    ///
    /// # Errors
    ///
    /// Returns error unless the intent is confirmed
    pub fn revert(&mut self) -> Result<()> {
        self.transition(IntentStatus::Confirmed, IntentStatus::Pending)
    }

    /// `Pending -> Rejected`
    ///
    /// # Errors
    ///
    /// Returns error unless the intent is pending
    pub fn reject(&mut self) -> Result<()> {
        self.transition(IntentStatus::Pending, IntentStatus::Rejected)
    }

    fn transition(&mut self, from: IntentStatus, to: IntentStatus) -> Result<()> {
        if self.status == from {
            self.status = to;
            tracing::debug!(intent = %self.id, ?from, ?to, "intent transition");
            Ok(())
        } else {
            Err(Error::Intent(format!(
                "cannot move intent {} from {:?} to {to:?}",
                self.id, self.status
            )))
        }
    }
}

static AFFIRMATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(yes|yep|yeah|sure|do it|please|go ahead|sounds good|ok|okay)\b")
        .expect("valid regex")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(no|nah|don['’]?t|stop|cancel|not now)\b").expect("valid regex")
});

/// Whether a confirmation reply reads as "yes"
#[must_use]
pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE.is_match(&text.trim().to_lowercase())
}

/// Whether a confirmation reply reads as "no"
#[must_use]
pub fn is_negative(text: &str) -> bool {
    NEGATIVE.is_match(&text.trim().to_lowercase())
}
