//! Sequential window-by-window transcription of a decoded recording.
//!
//! Windows are processed strictly in order, one recognition request at a
//! time. Ordering of the transcript falls out of the window order, and the
//! service never sees more than one in-flight request per run.

use crate::audio::AudioBuffer;
use crate::audio::wav::encode_wav;
use crate::chunk::{window_count, windows};
use crate::defaults;
use crate::error::{KikitoriError, Result};
use crate::stt::recognizer::{Outcome, SpeechRecognizer};
use crate::transcript::{Transcript, format_offset};

/// Configuration for one file transcription run.
#[derive(Debug, Clone)]
pub struct FilePipelineConfig {
    /// Window size in milliseconds. Must be positive.
    pub chunk_size_ms: u64,
    /// Locale code applied to every window in the run.
    pub language_code: String,
}

impl Default for FilePipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size_ms: defaults::CHUNK_SIZE_MS,
            language_code: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Progress reporting for a file run.
///
/// Called after each window completes; `completed` is monotonically
/// increasing and reaches `total` only when every window succeeded.
pub trait ProgressSink {
    fn report(&mut self, completed: usize, total: usize);
}

/// Progress sink that discards all reports.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _completed: usize, _total: usize) {}
}

/// Drives the chunker and the recognition client across a whole recording.
pub struct FilePipeline<'a> {
    recognizer: &'a dyn SpeechRecognizer,
    config: FilePipelineConfig,
}

impl<'a> FilePipeline<'a> {
    pub fn new(recognizer: &'a dyn SpeechRecognizer, config: FilePipelineConfig) -> Self {
        Self { recognizer, config }
    }

    /// Transcribe a decoded recording into an ordered transcript.
    ///
    /// Each window becomes one entry: the recognized text, or the
    /// unrecognized placeholder when the service found no speech. A service
    /// failure aborts the run immediately — remaining windows are never
    /// submitted and partial results are discarded, so the caller never
    /// mistakes a truncated transcript for a complete one.
    ///
    /// # Errors
    /// `ConfigInvalidValue` for a zero chunk size; `ServiceUnavailable` when
    /// any window's request fails.
    pub async fn run(
        &self,
        buffer: &AudioBuffer,
        progress: &mut dyn ProgressSink,
    ) -> Result<Transcript> {
        if self.config.chunk_size_ms == 0 {
            return Err(KikitoriError::ConfigInvalidValue {
                key: "recognition.chunk_size_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let duration_ms = buffer.duration_ms();
        let total = window_count(duration_ms, self.config.chunk_size_ms);
        let mut transcript = Transcript::new();

        for window in windows(duration_ms, self.config.chunk_size_ms) {
            let samples = buffer.slice_ms(window.start_ms, window.end_ms);
            let clip = encode_wav(samples, buffer.sample_rate())?;

            match self
                .recognizer
                .recognize(&clip, &self.config.language_code)
                .await
            {
                Outcome::Recognized(text) => {
                    transcript.push(format_offset(window.start_ms), text);
                }
                Outcome::NoSpeech => {
                    transcript.push(
                        format_offset(window.start_ms),
                        defaults::UNRECOGNIZED_PLACEHOLDER,
                    );
                }
                Outcome::ServiceUnavailable(detail) => {
                    return Err(KikitoriError::ServiceUnavailable { detail });
                }
            }

            progress.report(window.index + 1, total);
        }

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::recognizer::MockRecognizer;

    /// Progress sink that records every report.
    #[derive(Default)]
    struct CollectingProgress {
        reports: Vec<(usize, usize)>,
    }

    impl ProgressSink for CollectingProgress {
        fn report(&mut self, completed: usize, total: usize) {
            self.reports.push((completed, total));
        }
    }

    /// 16kHz mono buffer of the given duration.
    fn buffer_of_ms(ms: u64) -> AudioBuffer {
        AudioBuffer::new(vec![0i16; (ms * 16) as usize], 16_000)
    }

    fn config(chunk_size_ms: u64) -> FilePipelineConfig {
        FilePipelineConfig {
            chunk_size_ms,
            language_code: "en-US".to_string(),
        }
    }

    #[tokio::test]
    async fn three_windows_in_chronological_order() {
        let recognizer = MockRecognizer::new()
            .with_text("first minute")
            .with_text("second minute")
            .with_text("the rest");
        let pipeline = FilePipeline::new(&recognizer, config(60_000));

        let transcript = pipeline
            .run(&buffer_of_ms(150_000), &mut NullProgress)
            .await
            .unwrap();

        let labels: Vec<&str> = transcript
            .entries()
            .iter()
            .map(|e| e.time_label.as_str())
            .collect();
        assert_eq!(labels, vec!["00:00", "01:00", "02:00"]);
        assert_eq!(transcript.entries()[2].text, "the rest");
        assert_eq!(recognizer.call_count(), 3);
    }

    #[tokio::test]
    async fn silent_windows_become_placeholders_and_never_abort() {
        let recognizer = MockRecognizer::new(); // exhausted script => NoSpeech
        let pipeline = FilePipeline::new(&recognizer, config(60_000));

        let transcript = pipeline
            .run(&buffer_of_ms(150_000), &mut NullProgress)
            .await
            .unwrap();

        assert_eq!(transcript.len(), 3);
        for entry in transcript.entries() {
            assert_eq!(entry.text, defaults::UNRECOGNIZED_PLACEHOLDER);
        }
        assert_eq!(
            transcript.to_text(),
            "00:00 (unrecognized)\n01:00 (unrecognized)\n02:00 (unrecognized)"
        );
    }

    #[tokio::test]
    async fn service_failure_aborts_without_partial_transcript() {
        let recognizer = MockRecognizer::new()
            .with_text("kept nowhere")
            .with_outcome(Outcome::ServiceUnavailable("connection reset".to_string()))
            .with_text("never requested");
        let pipeline = FilePipeline::new(&recognizer, config(60_000));

        let result = pipeline.run(&buffer_of_ms(180_000), &mut NullProgress).await;

        match result {
            Err(KikitoriError::ServiceUnavailable { detail }) => {
                assert_eq!(detail, "connection reset");
            }
            other => panic!("Expected ServiceUnavailable, got {:?}", other),
        }
        // The third window must never have been submitted.
        assert_eq!(recognizer.call_count(), 2);
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_complete() {
        let recognizer = MockRecognizer::new();
        let pipeline = FilePipeline::new(&recognizer, config(60_000));
        let mut progress = CollectingProgress::default();

        pipeline
            .run(&buffer_of_ms(150_000), &mut progress)
            .await
            .unwrap();

        assert_eq!(progress.reports, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn progress_stops_at_failure() {
        let recognizer = MockRecognizer::new()
            .with_text("ok")
            .with_outcome(Outcome::ServiceUnavailable("down".to_string()));
        let pipeline = FilePipeline::new(&recognizer, config(60_000));
        let mut progress = CollectingProgress::default();

        let _ = pipeline.run(&buffer_of_ms(180_000), &mut progress).await;

        // Only the first window completed; the report never reaches 3/3.
        assert_eq!(progress.reports, vec![(1, 3)]);
    }

    #[tokio::test]
    async fn empty_buffer_yields_empty_transcript_without_calls() {
        let recognizer = MockRecognizer::new();
        let pipeline = FilePipeline::new(&recognizer, config(60_000));

        let transcript = pipeline
            .run(&buffer_of_ms(0), &mut NullProgress)
            .await
            .unwrap();

        assert!(transcript.is_empty());
        assert_eq!(recognizer.call_count(), 0);
    }

    #[tokio::test]
    async fn zero_chunk_size_is_rejected() {
        let recognizer = MockRecognizer::new();
        let pipeline = FilePipeline::new(&recognizer, config(0));

        let result = pipeline.run(&buffer_of_ms(1_000), &mut NullProgress).await;
        assert!(matches!(
            result,
            Err(KikitoriError::ConfigInvalidValue { .. })
        ));
        assert_eq!(recognizer.call_count(), 0);
    }

    #[tokio::test]
    async fn short_file_gets_single_window_at_zero() {
        let recognizer = MockRecognizer::new().with_text("hello");
        let pipeline = FilePipeline::new(&recognizer, config(60_000));

        let transcript = pipeline
            .run(&buffer_of_ms(5_000), &mut NullProgress)
            .await
            .unwrap();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.entries()[0].time_label, "00:00");
        assert_eq!(transcript.entries()[0].text, "hello");
    }
}
