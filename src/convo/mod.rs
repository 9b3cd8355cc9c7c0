//! Conversation core: transcript, intents, and the session controller

pub mod controller;
pub mod dates;
pub mod intent;
pub mod transcript;

pub use controller::{Controller, ControllerConfig};
pub use intent::{IntentKind, IntentStatus, TaskIntent};
pub use transcript::{Speaker, Transcript, Turn};
