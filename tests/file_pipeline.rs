//! End-to-end file-mode transcription against a mock recognition service.

use kikitori::audio::AudioBuffer;
use kikitori::audio::decode::decode_bytes;
use kikitori::pipeline::{FilePipeline, FilePipelineConfig, NullProgress, ProgressSink};
use kikitori::stt::recognizer::{MockRecognizer, Outcome};
use kikitori::{KikitoriError, defaults};
use std::io::Cursor;

/// 16kHz mono buffer of the given duration.
fn buffer_of_ms(ms: u64) -> AudioBuffer {
    AudioBuffer::new(vec![0i16; (ms * 16) as usize], 16_000)
}

fn config(chunk_size_ms: u64, language: &str) -> FilePipelineConfig {
    FilePipelineConfig {
        chunk_size_ms,
        language_code: language.to_string(),
    }
}

struct CollectingProgress {
    reports: Vec<(usize, usize)>,
}

impl ProgressSink for CollectingProgress {
    fn report(&mut self, completed: usize, total: usize) {
        self.reports.push((completed, total));
    }
}

#[tokio::test]
async fn two_and_a_half_minutes_yields_three_labeled_windows() {
    let recognizer = MockRecognizer::new()
        .with_text("welcome everyone")
        .with_text("first agenda item")
        .with_text("any questions");
    let pipeline = FilePipeline::new(&recognizer, config(60_000, "en-US"));

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
    assert_eq!(
        transcript.to_text(),
        "00:00 welcome everyone\n01:00 first agenda item\n02:00 any questions"
    );
}

#[tokio::test]
async fn silent_recording_yields_one_placeholder_per_window() {
    let recognizer = MockRecognizer::new(); // every window: NoSpeech
    let pipeline = FilePipeline::new(&recognizer, config(60_000, "ja-JP"));

    let transcript = pipeline
        .run(&buffer_of_ms(150_000), &mut NullProgress)
        .await
        .unwrap();

    assert_eq!(transcript.len(), 3);
    assert!(
        transcript
            .entries()
            .iter()
            .all(|e| e.text == defaults::UNRECOGNIZED_PLACEHOLDER)
    );
    // Labels ascend chronologically.
    let labels: Vec<&str> = transcript
        .entries()
        .iter()
        .map(|e| e.time_label.as_str())
        .collect();
    assert_eq!(labels, vec!["00:00", "01:00", "02:00"]);
}

#[tokio::test]
async fn outage_returns_empty_handed_and_stops_submitting() {
    let recognizer = MockRecognizer::new()
        .with_text("this result is discarded")
        .with_outcome(Outcome::ServiceUnavailable("503 from service".to_string()))
        .with_text("never reached");
    let pipeline = FilePipeline::new(&recognizer, config(60_000, "en-US"));
    let mut progress = CollectingProgress { reports: vec![] };

    let result = pipeline.run(&buffer_of_ms(240_000), &mut progress).await;

    match result {
        Err(KikitoriError::ServiceUnavailable { detail }) => {
            assert_eq!(detail, "503 from service")
        }
        other => panic!("Expected ServiceUnavailable, got {:?}", other),
    }
    // Windows 3 and 4 were never submitted.
    assert_eq!(recognizer.call_count(), 2);
    // Progress never claimed completion.
    assert_eq!(progress.reports, vec![(1, 4)]);
}

#[tokio::test]
async fn progress_reaches_total_only_on_full_success() {
    let recognizer = MockRecognizer::new();
    let pipeline = FilePipeline::new(&recognizer, config(60_000, "en-US"));
    let mut progress = CollectingProgress { reports: vec![] };

    pipeline
        .run(&buffer_of_ms(150_000), &mut progress)
        .await
        .unwrap();

    assert_eq!(progress.reports, vec![(1, 3), (2, 3), (3, 3)]);
    // Monotonic.
    assert!(progress.reports.windows(2).all(|p| p[0].0 < p[1].0));
}

#[tokio::test]
async fn decoded_wav_flows_through_the_pipeline() {
    // 3 seconds of 16kHz mono audio as a WAV container.
    let mut cursor = Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for _ in 0..(16_000 * 3) {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let buffer = decode_bytes(cursor.into_inner(), Some("wav")).unwrap();
    assert_eq!(buffer.duration_ms(), 3_000);

    let recognizer = MockRecognizer::new()
        .with_text("one")
        .with_text("two")
        .with_text("three");
    let pipeline = FilePipeline::new(&recognizer, config(1_000, "en-US"));

    let transcript = pipeline.run(&buffer, &mut NullProgress).await.unwrap();

    assert_eq!(
        transcript.to_text(),
        "00:00 one\n00:01 two\n00:02 three"
    );
}

#[tokio::test]
async fn language_code_is_applied_to_every_window() {
    // The mock ignores the code, but the pipeline must pass it through; a
    // recognizer asserting the code would fail loudly here if it changed.
    struct AssertingRecognizer;

    #[async_trait::async_trait]
    impl kikitori::SpeechRecognizer for AssertingRecognizer {
        async fn recognize(&self, _wav_clip: &[u8], language_code: &str) -> Outcome {
            assert_eq!(language_code, "ko-KR");
            Outcome::Recognized("ok".to_string())
        }
    }

    let recognizer = AssertingRecognizer;
    let pipeline = FilePipeline::new(&recognizer, config(60_000, "ko-KR"));

    let transcript = pipeline
        .run(&buffer_of_ms(120_000), &mut NullProgress)
        .await
        .unwrap();
    assert_eq!(transcript.len(), 2);
}
