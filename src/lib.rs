//! kikitori - Timestamped speech-to-text for meeting notes
//!
//! Transcribes uploaded audio files window by window through a remote
//! recognition service, or live microphone speech one utterance at a time.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

#[cfg(feature = "cli")]
pub mod app;
pub mod audio;
pub mod chunk;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod language;
pub mod live;
pub mod pipeline;
pub mod stt;
pub mod transcript;

// Core traits (audio in → recognition → transcript out)
pub use audio::{AudioBuffer, AudioInput};
pub use stt::recognizer::{Outcome, SpeechRecognizer};

// Pipeline
pub use pipeline::orchestrator::{FilePipeline, FilePipelineConfig, ProgressSink};

// Error handling
pub use error::{KikitoriError, Result};

// Config
pub use config::Config;
pub use language::Language;
pub use transcript::{Transcript, TranscriptEntry};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
