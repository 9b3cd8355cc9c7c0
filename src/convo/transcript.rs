//! Conversation transcript
//!
//! The transcript is the append-only, session-lifetime history of turns.
//! Each session owns exactly one; nothing is persisted beyond it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label used when rendering the transcript for the reasoning endpoint
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One message unit in the conversation
///
/// Immutable once appended to the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
    /// Reference to the audio clip this turn was transcribed from or
    /// synthesized to, if any
    pub audio_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    /// Create an assistant turn
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            speaker,
            text: text.into(),
            audio_ref: None,
            created_at: Utc::now(),
        }
    }

    /// Attach an audio clip reference
    #[must_use]
    pub fn with_audio_ref(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into());
        self
    }
}

/// Ordered, append-only history of turns for one session
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Number of turns recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether any turns have been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent `max_turns` turns, oldest first
    #[must_use]
    pub fn window(&self, max_turns: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(max_turns);
        &self.turns[start..]
    }
}
