//! Conversation controller
//!
//! Mediates one user turn into exactly one assistant turn and at most one
//! task dispatch. Owns the session transcript and the pending intent; the
//! intent only ever reaches the automation webhook after an explicit
//! affirmative turn from the user.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

use crate::automation::retry::{RetryPolicy, delay_for_attempt};
use crate::automation::{TaskDispatcher, TaskPayload};
use crate::convo::dates::{local_today, parse_due_date};
use crate::convo::intent::{TaskIntent, is_affirmative, is_negative};
use crate::convo::transcript::{Transcript, Turn};
use crate::reasoning::{Reasoner, TaskDraft};

/// Reply when the reasoning endpoint is unreachable or times out
const MSG_REASONING_UNAVAILABLE: &str =
    "Sorry, I'm having trouble reaching my reasoning service right now. Please try again in a moment.";

/// Reply when the user turn carried no usable text
const MSG_EMPTY_INPUT: &str = "I didn't catch that. Could you say it again?";

/// Reply when a due date is still missing
const MSG_ASK_DATE: &str = "What date should I set for this?";

/// Reply when a pending task is cancelled
const MSG_CANCELLED: &str = "Okay, I won't add it.";

/// Reply when task creation is requested but no webhook is configured
const MSG_NO_WEBHOOK: &str =
    "I can't create tasks right now: no automation webhook is configured.";

/// Longest notes excerpt echoed back in confirmation prompts
const NOTES_PREVIEW_CHARS: usize = 300;

/// Tunables for a conversation session
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Recent turns included in the reasoning window
    pub window_turns: usize,
    /// Total dispatch attempts per confirmed intent
    pub max_dispatch_attempts: u32,
    /// Backoff policy between dispatch attempts
    pub retry: RetryPolicy,
    /// UTC offset for resolving relative dates
    pub timezone: FixedOffset,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            window_turns: 12,
            max_dispatch_attempts: 3,
            retry: RetryPolicy::default(),
            timezone: Utc.fix(),
        }
    }
}

/// What the controller is waiting on for the pending intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStage {
    /// The draft had no parseable due date; waiting for the user to name one
    AwaitingDueDate,
    /// Waiting for a yes/no on the full draft
    AwaitingConfirmation,
}

/// A pending intent plus the conversational stage it is stuck on
#[derive(Debug)]
struct PendingIntent {
    intent: TaskIntent,
    stage: PendingStage,
}

/// Per-session conversation controller
///
/// Exclusively owns its transcript and pending intent; a session processes
/// one turn at a time, so no internal locking is needed.
pub struct Controller {
    reasoner: Arc<dyn Reasoner>,
    dispatcher: Option<Arc<dyn TaskDispatcher>>,
    config: ControllerConfig,
    transcript: Transcript,
    pending: Option<PendingIntent>,
}

impl Controller {
    /// Create a controller for a fresh session
    #[must_use]
    pub fn new(
        reasoner: Arc<dyn Reasoner>,
        dispatcher: Option<Arc<dyn TaskDispatcher>>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            reasoner,
            dispatcher,
            config,
            transcript: Transcript::new(),
            pending: None,
        }
    }

    /// The session transcript, oldest turn first
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The intent currently awaiting user input, if any
    #[must_use]
    pub fn pending_intent(&self) -> Option<&TaskIntent> {
        self.pending.as_ref().map(|p| &p.intent)
    }

    /// Handle one user turn and return the resulting assistant turn
    ///
    /// The user turn is always recorded, and exactly one assistant turn is
    /// always produced; failures of the external services surface as
    /// user-visible text, never as errors.
    pub async fn handle_user_turn(&mut self, text: &str, audio_ref: Option<String>) -> Turn {
        let mut user_turn = Turn::user(text);
        if let Some(audio_ref) = audio_ref {
            user_turn = user_turn.with_audio_ref(audio_ref);
        }
        self.transcript.push(user_turn);

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.push_assistant(MSG_EMPTY_INPUT);
        }

        let today = local_today(self.config.timezone);

        match self.pending.take() {
            Some(pending) if pending.stage == PendingStage::AwaitingDueDate => {
                self.collect_due_date(pending, trimmed, today)
            }
            Some(mut pending)
                if pending.stage == PendingStage::AwaitingConfirmation
                    && is_negative(trimmed) =>
            {
                if let Err(e) = pending.intent.reject() {
                    tracing::warn!(error = %e, "reject transition failed");
                }
                tracing::info!(title = %pending.intent.title, "task cancelled by user");
                self.push_assistant(MSG_CANCELLED)
            }
            Some(pending)
                if pending.stage == PendingStage::AwaitingConfirmation
                    && is_affirmative(trimmed) =>
            {
                self.dispatch_confirmed(pending).await
            }
            other => {
                // Unrelated turn: any pending intent stays as it was
                self.pending = other;
                self.converse(today).await
            }
        }
    }

    /// A due-date follow-up reply arrived for the pending draft
    fn collect_due_date(
        &mut self,
        mut pending: PendingIntent,
        text: &str,
        today: NaiveDate,
    ) -> Turn {
        let Some(date) = parse_due_date(text, today) else {
            self.pending = Some(pending);
            return self.push_assistant(MSG_ASK_DATE);
        };

        pending.intent.due = Some(date);
        pending.stage = PendingStage::AwaitingConfirmation;
        let prompt = confirmation_prompt(&pending.intent);
        self.pending = Some(pending);
        self.push_assistant(prompt)
    }

    /// The user said yes: confirm the intent and dispatch it with bounded
    /// retries
    async fn dispatch_confirmed(&mut self, mut pending: PendingIntent) -> Turn {
        let Some(due) = pending.intent.due else {
            // Should not happen from AwaitingConfirmation; re-ask rather
            // than dispatch a dateless task
            pending.stage = PendingStage::AwaitingDueDate;
            let title = pending.intent.title.clone();
            self.pending = Some(pending);
            return self.push_assistant(format!("When should I set \"{title}\"?"));
        };

        let Some(dispatcher) = self.dispatcher.clone() else {
            if let Err(e) = pending.intent.reject() {
                tracing::warn!(error = %e, "reject transition failed");
            }
            tracing::warn!(title = %pending.intent.title, "dispatch requested without webhook");
            return self.push_assistant(MSG_NO_WEBHOOK);
        };

        if let Err(e) = pending.intent.confirm() {
            tracing::warn!(error = %e, "confirm transition failed");
        }

        let payload = TaskPayload::new(
            pending.intent.title.clone(),
            due,
            pending.intent.notes.clone(),
        );
        let max_attempts = self.config.max_dispatch_attempts.max(1);

        let mut attempt = 0_u32;
        let failure = loop {
            match dispatcher.dispatch(&payload).await {
                Ok(()) => {
                    if let Err(e) = pending.intent.mark_dispatched() {
                        tracing::warn!(error = %e, "dispatched transition failed");
                    }
                    let text = format!(
                        "Done! I've added \"{}\" for {due}.",
                        pending.intent.title
                    );
                    return self.push_assistant(text);
                }
                Err(err) => {
                    attempt += 1;
                    if !err.is_recoverable() || attempt >= max_attempts {
                        break err;
                    }
                    let delay = delay_for_attempt(&self.config.retry, attempt - 1, err.retry_after());
                    tracing::warn!(attempt, ?delay, error = %err, "dispatch failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        };

        if let Err(e) = pending.intent.revert() {
            tracing::warn!(error = %e, "revert transition failed");
        }
        if let Err(e) = pending.intent.reject() {
            tracing::warn!(error = %e, "reject transition failed");
        }
        tracing::error!(title = %pending.intent.title, error = %failure, "task dispatch gave up");
        self.push_assistant(format!("I couldn't create that task: {failure}"))
    }

    /// Plain conversation: ask the reasoning endpoint and act on its reply
    async fn converse(&mut self, today: NaiveDate) -> Turn {
        let result = {
            let window = self.transcript.window(self.config.window_turns);
            self.reasoner.reply(window).await
        };

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, "reasoning failed");
                return self.push_assistant(MSG_REASONING_UNAVAILABLE);
            }
        };

        if let Some(draft) = reply.task {
            return self.propose_task(draft, today);
        }

        if reply.text.is_empty() {
            return self.push_assistant("Okay.");
        }
        self.push_assistant(reply.text)
    }

    /// The reasoning reply carried a task draft: stage it for confirmation
    fn propose_task(&mut self, draft: TaskDraft, today: NaiveDate) -> Turn {
        let due = parse_due_date(&draft.due, today);
        let intent = TaskIntent::create_task(draft.title, due, draft.notes);
        tracing::info!(title = %intent.title, ?due, "task draft staged");

        // A fresh draft replaces whatever was pending
        if let Some(mut old) = self.pending.take() {
            if let Err(e) = old.intent.reject() {
                tracing::warn!(error = %e, "reject transition failed");
            }
        }

        let (stage, prompt) = if due.is_some() {
            (
                PendingStage::AwaitingConfirmation,
                confirmation_prompt(&intent),
            )
        } else {
            (
                PendingStage::AwaitingDueDate,
                format!("When should I set \"{}\"?", intent.title),
            )
        };

        self.pending = Some(PendingIntent { intent, stage });
        self.push_assistant(prompt)
    }

    /// Append an assistant turn and return it
    fn push_assistant(&mut self, text: impl Into<String>) -> Turn {
        let turn = Turn::assistant(text);
        self.transcript.push(turn.clone());
        turn
    }
}

/// Confirmation prompt echoing the draft back to the user
fn confirmation_prompt(intent: &TaskIntent) -> String {
    let due = intent
        .due
        .map_or_else(|| "an upcoming day".to_string(), |d| d.to_string());
    let notes = if intent.notes.is_empty() {
        "(none)".to_string()
    } else {
        preview(&intent.notes, NOTES_PREVIEW_CHARS)
    };

    format!(
        "I can add \"{}\" for {due}.\nNotes preview: {notes}\nShould I save it?",
        intent.title
    )
}

/// First `max_chars` characters, with a trailing ellipsis when cut
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
