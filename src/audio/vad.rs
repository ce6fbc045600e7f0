//! Voice activity detection for live capture.
//!
//! RMS-based thresholding with a small state machine: speech begins when a
//! read crosses the threshold and ends once silence has lasted the configured
//! cutoff. Time is taken from a `Clock` trait so tests can run instantly.

use crate::defaults;
use std::time::Instant;

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for voice activity detection.
#[derive(Debug, Clone, Copy)]
pub struct VadConfig {
    /// RMS threshold for detecting speech (0.0 to 1.0).
    pub speech_threshold: f32,
    /// Silence duration before speech is considered ended (milliseconds).
    pub silence_duration_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            speech_threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

/// Current detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    /// No speech detected yet.
    Idle,
    /// Speech in progress.
    Speaking,
    /// Below threshold while speaking; waiting out the silence cutoff.
    MaybeSilence,
    /// Speech has ended.
    Stopped,
}

/// Event produced for each processed read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEvent {
    SpeechStart,
    Speech,
    Silence,
    SpeechEnd,
}

/// Voice activity detector state machine.
pub struct Vad<C: Clock = SystemClock> {
    config: VadConfig,
    state: VadState,
    silence_start: Option<Instant>,
    clock: C,
}

impl Vad<SystemClock> {
    pub fn new(config: VadConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Vad<C> {
    pub fn with_clock(config: VadConfig, clock: C) -> Self {
        Self {
            config,
            state: VadState::Idle,
            silence_start: None,
            clock,
        }
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    /// Feed one read of samples and advance the state machine.
    pub fn process(&mut self, samples: &[i16]) -> VadEvent {
        let is_speech = calculate_rms(samples) > self.config.speech_threshold;
        let now = self.clock.now();

        match self.state {
            VadState::Idle => {
                if is_speech {
                    self.state = VadState::Speaking;
                    self.silence_start = None;
                    VadEvent::SpeechStart
                } else {
                    VadEvent::Silence
                }
            }
            VadState::Speaking => {
                if is_speech {
                    VadEvent::Speech
                } else {
                    self.state = VadState::MaybeSilence;
                    self.silence_start = Some(now);
                    VadEvent::Silence
                }
            }
            VadState::MaybeSilence => {
                if is_speech {
                    self.state = VadState::Speaking;
                    self.silence_start = None;
                    VadEvent::Speech
                } else {
                    let elapsed_ms = self
                        .silence_start
                        .map(|start| now.duration_since(start).as_millis() as u32)
                        .unwrap_or(0);

                    if elapsed_ms >= self.config.silence_duration_ms {
                        self.state = VadState::Stopped;
                        self.silence_start = None;
                        VadEvent::SpeechEnd
                    } else {
                        VadEvent::Silence
                    }
                }
            }
            VadState::Stopped => VadEvent::Silence,
        }
    }

    /// Reset to `Idle` for the next capture cycle.
    pub fn reset(&mut self) {
        self.state = VadState::Idle;
        self.silence_start = None;
    }
}

/// Root-mean-square level of a sample block, normalized to 0.0..=1.0.
pub fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum_squares / samples.len() as f64).sqrt() as f32
}
