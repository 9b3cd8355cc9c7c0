//! Voice adapters
//!
//! Speech recognition and synthesis are delegated to external HTTP services;
//! no audio is processed locally.

pub mod stt;
pub mod tts;

pub use stt::SpeechToText;
pub use tts::TextToSpeech;
