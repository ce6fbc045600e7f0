//! Live microphone transcription.
//!
//! A `LiveSession` is the typed session object owned by the CLI host: it
//! holds the capture state and the transcript accumulated across start/stop
//! cycles. Each entry into `run_cycle` performs at most one bounded
//! capture-and-transcribe pass; the host re-invokes it while the session
//! stays in `Listening`.

use crate::audio::AudioInput;
use crate::audio::vad::{Clock, SystemClock, Vad, VadConfig, VadEvent};
use crate::audio::wav::encode_wav;
use crate::defaults;
use crate::error::{KikitoriError, Result};
use crate::stt::recognizer::{Outcome, SpeechRecognizer};
use crate::transcript::{Transcript, format_wall_clock};
use chrono::Local;
use std::thread;
use std::time::Duration;

/// Configuration for live capture cycles.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// How long to wait for speech onset before giving up the cycle.
    pub listen_timeout_ms: u64,
    /// Hard cap on a single utterance's duration.
    pub max_phrase_ms: u64,
    /// Trailing silence that ends an utterance early.
    pub silence_duration_ms: u32,
    /// RMS threshold for speech onset.
    pub vad_threshold: f32,
    /// Capture sample rate.
    pub sample_rate: u32,
    /// Locale code applied to every utterance in the session.
    pub language_code: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            listen_timeout_ms: defaults::LISTEN_TIMEOUT_MS,
            max_phrase_ms: defaults::MAX_PHRASE_MS,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            vad_threshold: defaults::VAD_THRESHOLD,
            sample_rate: defaults::SAMPLE_RATE,
            language_code: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Session capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Listening,
}

/// What one capture cycle accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// An utterance was recognized and appended to the transcript.
    Recognized,
    /// The service found no speech in the utterance; nothing appended.
    NoSpeech,
    /// No speech onset before the listen timeout; nothing appended.
    ListenTimeout,
    /// The session is not listening; nothing happened.
    Idle,
}

/// Live transcription session: state machine plus accumulated transcript.
#[derive(Debug)]
pub struct LiveSession {
    state: CaptureState,
    transcript: Transcript,
}

impl Default for LiveSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            transcript: Transcript::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Begin listening. Prior entries are kept; the transcript persists
    /// across stop/start until explicitly cleared.
    pub fn start(&mut self) {
        self.state = CaptureState::Listening;
    }

    /// Stop listening, retaining everything captured so far.
    pub fn stop(&mut self) {
        self.state = CaptureState::Idle;
    }

    /// Empty the transcript. Valid in either state.
    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    /// Perform one capture-and-transcribe cycle.
    ///
    /// Waits up to the listen timeout for speech onset, captures until the
    /// silence cutoff or the phrase limit, then recognizes the utterance
    /// synchronously. An entry is appended only for a `Recognized` outcome,
    /// stamped with the wall-clock time at append.
    ///
    /// # Errors
    /// Capture failures and `ServiceUnavailable` outcomes are surfaced as
    /// errors for this cycle; the session itself stays intact and listening.
    pub async fn run_cycle(
        &mut self,
        input: &mut dyn AudioInput,
        recognizer: &dyn SpeechRecognizer,
        config: &LiveConfig,
    ) -> Result<CycleOutcome> {
        self.run_cycle_with_clock(input, recognizer, config, &SystemClock)
            .await
    }

    /// `run_cycle` with an injected clock, for tests.
    pub async fn run_cycle_with_clock<C: Clock>(
        &mut self,
        input: &mut dyn AudioInput,
        recognizer: &dyn SpeechRecognizer,
        config: &LiveConfig,
        clock: &C,
    ) -> Result<CycleOutcome> {
        if self.state() != CaptureState::Listening {
            return Ok(CycleOutcome::Idle);
        }

        let utterance = match capture_utterance(input, config, clock)? {
            Some(samples) => samples,
            None => return Ok(CycleOutcome::ListenTimeout),
        };

        let clip = encode_wav(&utterance, config.sample_rate)?;

        match recognizer.recognize(&clip, &config.language_code).await {
            Outcome::Recognized(text) => {
                self.transcript.push(format_wall_clock(Local::now()), text);
                Ok(CycleOutcome::Recognized)
            }
            Outcome::NoSpeech => Ok(CycleOutcome::NoSpeech),
            Outcome::ServiceUnavailable(detail) => {
                Err(KikitoriError::ServiceUnavailable { detail })
            }
        }
    }
}

/// Capture one bounded utterance from the input.
///
/// Returns `None` when no speech onset occurred within the listen timeout.
/// After onset, capture continues until the VAD reports speech end or the
/// accumulated audio reaches the phrase limit.
fn capture_utterance<C: Clock>(
    input: &mut dyn AudioInput,
    config: &LiveConfig,
    clock: &C,
) -> Result<Option<Vec<i16>>> {
    input.start()?;

    let mut vad = Vad::with_clock(
        VadConfig {
            speech_threshold: config.vad_threshold,
            silence_duration_ms: config.silence_duration_ms,
        },
        clock,
    );

    let onset_deadline = clock.now() + Duration::from_millis(config.listen_timeout_ms);
    let mut captured: Vec<i16> = Vec::new();
    let mut speaking = false;

    let result = loop {
        let samples = input.read_samples()?;

        if samples.is_empty() {
            if !speaking && clock.now() >= onset_deadline {
                break None;
            }
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        match vad.process(&samples) {
            VadEvent::SpeechStart => {
                speaking = true;
                captured.extend_from_slice(&samples);
            }
            VadEvent::Speech => {
                captured.extend_from_slice(&samples);
            }
            VadEvent::Silence => {
                if speaking {
                    // Keep accumulating; the speaker may resume.
                    captured.extend_from_slice(&samples);
                } else if clock.now() >= onset_deadline {
                    break None;
                }
            }
            VadEvent::SpeechEnd => {
                break Some(std::mem::take(&mut captured));
            }
        }

        if speaking && duration_ms(&captured, config.sample_rate) >= config.max_phrase_ms {
            break Some(std::mem::take(&mut captured));
        }
    };

    input.stop()?;
    Ok(result)
}

fn duration_ms(samples: &[i16], sample_rate: u32) -> u64 {
    samples.len() as u64 * 1000 / sample_rate as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockAudioInput;
    use crate::stt::recognizer::MockRecognizer;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Clock that advances a fixed step on every `now()` call.
    struct SteppingClock {
        current: Mutex<Instant>,
        step: Duration,
    }

    impl SteppingClock {
        fn new(step_ms: u64) -> Self {
            Self {
                current: Mutex::new(Instant::now()),
                step: Duration::from_millis(step_ms),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Instant {
            let mut current = self.current.lock().unwrap();
            let now = *current;
            *current += self.step;
            now
        }
    }

    fn test_config() -> LiveConfig {
        LiveConfig {
            listen_timeout_ms: 5_000,
            max_phrase_ms: 10_000,
            silence_duration_ms: 0,
            vad_threshold: 0.02,
            sample_rate: 16_000,
            language_code: "en-US".to_string(),
        }
    }

    fn loud_chunk() -> Vec<i16> {
        vec![8_000i16; 160]
    }

    fn quiet_chunk() -> Vec<i16> {
        vec![0i16; 160]
    }

    fn wall_clock_label_shape(label: &str) -> bool {
        label.len() == 8 && label.as_bytes()[2] == b':' && label.as_bytes()[5] == b':'
    }

    #[test]
    fn start_stop_preserves_entries() {
        let mut session = LiveSession::new();
        assert_eq!(session.state(), CaptureState::Idle);

        session.start();
        assert_eq!(session.state(), CaptureState::Listening);
        session.transcript.push("10:00:00", "remembered");

        session.stop();
        assert_eq!(session.state(), CaptureState::Idle);
        assert_eq!(session.transcript().len(), 1);

        // Restarting does not clear prior entries.
        session.start();
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn clear_empties_transcript_in_either_state() {
        let mut session = LiveSession::new();
        session.transcript.push("10:00:00", "old");
        session.clear();
        assert!(session.transcript().is_empty());

        session.start();
        session.transcript.push("10:00:01", "newer");
        session.clear();
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), CaptureState::Listening);
    }

    #[tokio::test]
    async fn idle_session_does_nothing() {
        let mut session = LiveSession::new();
        let mut input = MockAudioInput::new().with_chunk(loud_chunk());
        let recognizer = MockRecognizer::new().with_text("should not run");

        let outcome = session
            .run_cycle(&mut input, &recognizer, &test_config())
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Idle);
        assert_eq!(recognizer.call_count(), 0);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn recognized_utterance_appends_wall_clock_entry() {
        let mut session = LiveSession::new();
        session.start();

        // Speech, then enough silence for the cutoff (0ms in tests).
        let mut input = MockAudioInput::new()
            .with_chunk(loud_chunk())
            .with_chunk(quiet_chunk())
            .with_chunk(quiet_chunk())
            .with_repeat_last();
        let recognizer = MockRecognizer::new().with_text("meeting starts now");
        let clock = SteppingClock::new(100);

        let outcome = session
            .run_cycle_with_clock(&mut input, &recognizer, &test_config(), &clock)
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Recognized);
        assert_eq!(session.transcript().len(), 1);
        let entry = &session.transcript().entries()[0];
        assert_eq!(entry.text, "meeting starts now");
        assert!(
            wall_clock_label_shape(&entry.time_label),
            "expected HH:MM:SS, got {}",
            entry.time_label
        );
    }

    #[tokio::test]
    async fn listen_timeout_appends_nothing_and_keeps_listening() {
        let mut session = LiveSession::new();
        session.start();

        let mut input = MockAudioInput::new()
            .with_chunk(quiet_chunk())
            .with_repeat_last();
        let recognizer = MockRecognizer::new();
        // Each now() call advances 1s; the 5s onset deadline passes quickly.
        let clock = SteppingClock::new(1_000);

        let outcome = session
            .run_cycle_with_clock(&mut input, &recognizer, &test_config(), &clock)
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::ListenTimeout);
        assert_eq!(recognizer.call_count(), 0);
        assert!(session.transcript().is_empty());
        assert_eq!(session.state(), CaptureState::Listening);
    }

    #[tokio::test]
    async fn phrase_limit_cuts_off_continuous_speech() {
        let mut session = LiveSession::new();
        session.start();

        let config = LiveConfig {
            max_phrase_ms: 100, // ten 10ms chunks
            ..test_config()
        };
        let mut input = MockAudioInput::new()
            .with_chunk(loud_chunk())
            .with_repeat_last();
        let recognizer = MockRecognizer::new().with_text("cut off");
        let clock = SteppingClock::new(1);

        let outcome = session
            .run_cycle_with_clock(&mut input, &recognizer, &config, &clock)
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Recognized);
        assert_eq!(recognizer.call_count(), 1);
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn no_speech_outcome_appends_nothing() {
        let mut session = LiveSession::new();
        session.start();

        let mut input = MockAudioInput::new()
            .with_chunk(loud_chunk())
            .with_chunk(quiet_chunk())
            .with_chunk(quiet_chunk())
            .with_repeat_last();
        let recognizer = MockRecognizer::new(); // exhausted => NoSpeech
        let clock = SteppingClock::new(100);

        let outcome = session
            .run_cycle_with_clock(&mut input, &recognizer, &test_config(), &clock)
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::NoSpeech);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn service_failure_is_surfaced_but_session_survives() {
        let mut session = LiveSession::new();
        session.start();
        session.transcript.push("10:00:00", "earlier");

        let mut input = MockAudioInput::new()
            .with_chunk(loud_chunk())
            .with_chunk(quiet_chunk())
            .with_chunk(quiet_chunk())
            .with_repeat_last();
        let recognizer = MockRecognizer::new()
            .with_outcome(Outcome::ServiceUnavailable("dns failure".to_string()));
        let clock = SteppingClock::new(100);

        let result = session
            .run_cycle_with_clock(&mut input, &recognizer, &test_config(), &clock)
            .await;

        assert!(matches!(
            result,
            Err(KikitoriError::ServiceUnavailable { .. })
        ));
        // Prior entries and the listening state are untouched.
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.state(), CaptureState::Listening);
    }

    #[tokio::test]
    async fn capture_failure_is_surfaced() {
        let mut session = LiveSession::new();
        session.start();

        let mut input = MockAudioInput::new().with_start_failure();
        let recognizer = MockRecognizer::new();

        let result = session
            .run_cycle(&mut input, &recognizer, &test_config())
            .await;

        assert!(matches!(result, Err(KikitoriError::AudioCapture { .. })));
    }
}
