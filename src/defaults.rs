//! Default configuration constants for kikitori.
//!
//! Shared between the config layer, the CLI, and the processing modules so
//! the same values are used everywhere.

/// Processing sample rate in Hz.
///
/// Decoded audio and microphone capture are both normalized to 16kHz mono,
/// the standard rate for speech recognition payloads.
pub const SAMPLE_RATE: u32 = 16000;

/// Default window size for file transcription in milliseconds.
///
/// A long recording is split into windows of this duration and each window is
/// sent to the recognition service as one request. 60 seconds keeps requests
/// well under typical service payload limits.
pub const CHUNK_SIZE_MS: u64 = 60_000;

/// Default wait for speech onset in live mode, in milliseconds.
///
/// If nothing crosses the VAD threshold within this window, the capture
/// cycle gives up without an error and the loop listens again.
pub const LISTEN_TIMEOUT_MS: u64 = 5_000;

/// Default maximum utterance duration in live mode, in milliseconds.
///
/// A phrase is cut off at this length even if the speaker has not paused.
pub const MAX_PHRASE_MS: u64 = 10_000;

/// Default silence duration in milliseconds before an utterance is considered
/// finished.
///
/// 1500ms allows for natural pauses without splitting a sentence.
pub const SILENCE_DURATION_MS: u32 = 1_500;

/// Default Voice Activity Detection (VAD) threshold.
///
/// RMS-based threshold (0.0 to 1.0) for detecting speech onset in live mode,
/// tuned for typical microphone input levels.
pub const VAD_THRESHOLD: f32 = 0.02;

/// Default recognition language (BCP-47 locale code).
pub const DEFAULT_LANGUAGE: &str = "ja-JP";

/// Default recognition service endpoint.
///
/// Speaks the speech-api v2 protocol: WAV bytes in, one JSON object per
/// line out, with `lang` and optional `key` query parameters.
pub const DEFAULT_ENDPOINT: &str = "http://www.google.com/speech-api/v2/recognize";

/// Per-request timeout for recognition calls, in seconds.
///
/// A window's request either completes or fails within this bound; there is
/// no retry.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Text recorded for a window in which the service found no speech.
pub const UNRECOGNIZED_PLACEHOLDER: &str = "(unrecognized)";

/// Export filename prefix for file-mode transcripts.
pub const FILE_EXPORT_PREFIX: &str = "transcription";

/// Export filename prefix for live-mode transcripts.
pub const LIVE_EXPORT_PREFIX: &str = "realtime_transcription";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_is_one_minute() {
        assert_eq!(CHUNK_SIZE_MS, 60 * 1000);
    }

    #[test]
    fn phrase_limit_exceeds_listen_timeout() {
        // A cycle always has room to capture after onset is detected.
        assert!(MAX_PHRASE_MS > 0);
        assert!(LISTEN_TIMEOUT_MS > 0);
    }
}
