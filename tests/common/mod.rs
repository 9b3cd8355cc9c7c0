//! Shared test doubles for the conversation and API tests
//!
//! The reasoning endpoint and automation webhook are faked with scripted
//! responses so the full confirmation flow can run without the network.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use attache_gateway::automation::{DispatchError, TaskDispatcher, TaskPayload};
use attache_gateway::reasoning::{Reasoner, ReasoningReply, TaskDraft};
use attache_gateway::{Controller, ControllerConfig, Error, Result, RetryPolicy, Turn};

/// Reasoner that answers from a scripted list, oldest first
///
/// Once the script runs out it answers with a plain "Okay.".
pub struct ScriptedReasoner {
    replies: Mutex<Vec<Result<ReasoningReply>>>,
    calls: AtomicUsize,
}

impl ScriptedReasoner {
    pub fn new(replies: Vec<Result<ReasoningReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        })
    }

    /// A plain conversational reply
    pub fn plain(text: &str) -> Result<ReasoningReply> {
        Ok(ReasoningReply::plain(text.to_string()))
    }

    /// A reply carrying a task draft
    pub fn with_task(text: &str, title: &str, due: &str, notes: &str) -> Result<ReasoningReply> {
        Ok(ReasoningReply {
            text: text.to_string(),
            task: Some(TaskDraft {
                title: title.to_string(),
                due: due.to_string(),
                notes: notes.to_string(),
            }),
        })
    }

    /// An unreachable-endpoint failure
    pub fn unreachable() -> Result<ReasoningReply> {
        Err(Error::Reasoning("connect timeout".to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Reasoner for ScriptedReasoner {
    async fn reply(&self, _window: &[Turn]) -> Result<ReasoningReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok(ReasoningReply::plain("Okay.".to_string()))
        } else {
            replies.remove(0)
        }
    }
}

/// Dispatcher that counts attempts and answers from a scripted list
///
/// Once the script runs out every attempt succeeds.
pub struct CountingDispatcher {
    results: Mutex<Vec<std::result::Result<(), DispatchError>>>,
    calls: AtomicUsize,
    last_payload: Mutex<Option<TaskPayload>>,
}

impl CountingDispatcher {
    /// Every attempt succeeds
    pub fn succeeding() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    /// Attempts answer from the script, oldest first, then succeed
    pub fn scripted(results: Vec<std::result::Result<(), DispatchError>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results),
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        })
    }

    /// A recoverable 500 failure
    pub fn server_error() -> DispatchError {
        DispatchError::Status {
            status: 500,
            body: "internal error".to_string(),
            retry_after: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Option<TaskPayload> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskDispatcher for CountingDispatcher {
    async fn dispatch(&self, payload: &TaskPayload) -> std::result::Result<(), DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(())
        } else {
            results.remove(0)
        }
    }
}

/// Build a controller with instant retries for tests
pub fn controller(
    reasoner: Arc<ScriptedReasoner>,
    dispatcher: Option<Arc<CountingDispatcher>>,
) -> Controller {
    let config = ControllerConfig {
        retry: RetryPolicy {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        },
        ..ControllerConfig::default()
    };

    Controller::new(
        reasoner,
        dispatcher.map(|d| d as Arc<dyn TaskDispatcher>),
        config,
    )
}
