//! Recognition client contract.
//!
//! Every recognition attempt resolves to exactly one tagged outcome rather
//! than an exception path: found-no-speech is an ordinary result the caller
//! records, while a service failure is a value the caller can translate into
//! an abort (file mode) or a per-cycle warning (live mode).

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result of one recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service returned a confident transcript.
    Recognized(String),
    /// The service understood the audio but found no speech in it.
    NoSpeech,
    /// Network or service failure; the attempt cannot be distinguished from
    /// an outage affecting subsequent calls.
    ServiceUnavailable(String),
}

/// Trait for speech recognition backends.
///
/// One invocation makes at most one outbound call; there is no retry logic.
/// This trait allows swapping implementations (remote service vs mock).
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize one standalone WAV clip in the given language.
    async fn recognize(&self, wav_clip: &[u8], language_code: &str) -> Outcome;
}

/// Mock recognizer for testing.
///
/// Serves a scripted queue of outcomes, one per call, and counts calls so
/// tests can assert the client was not invoked after an abort. An exhausted
/// script yields `NoSpeech`.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome to the script.
    // Panicking on a poisoned queue is fine here: the mock only runs in tests.
    #[allow(clippy::expect_used)]
    pub fn with_outcome(self, outcome: Outcome) -> Self {
        self.outcomes
            .lock()
            .expect("mock outcome queue poisoned")
            .push_back(outcome);
        self
    }

    /// Append `Recognized(text)` to the script.
    pub fn with_text(self, text: &str) -> Self {
        self.with_outcome(Outcome::Recognized(text.to_string()))
    }

    /// Number of `recognize` invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    #[allow(clippy::expect_used)]
    async fn recognize(&self, _wav_clip: &[u8], _language_code: &str) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .expect("mock outcome queue poisoned")
            .pop_front()
            .unwrap_or(Outcome::NoSpeech)
    }
}
