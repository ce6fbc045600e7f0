//! Audio primitives: decoded buffers, container decoding, WAV clip encoding,
//! microphone input, and voice activity detection.

pub mod decode;
pub mod vad;
pub mod wav;

#[cfg(feature = "mic")]
pub mod capture;

use crate::error::{KikitoriError, Result};

/// A fully decoded recording: mono 16-bit PCM at a known sample rate.
///
/// Immutable once produced by the decoder; the file pipeline borrows it for
/// the duration of one transcription run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap decoded mono samples. `sample_rate` must be positive.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total duration in milliseconds, truncated to whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Borrow the samples covering `[start_ms, end_ms)`.
    ///
    /// Offsets past the end of the buffer are clamped, so the final window of
    /// a recording never reads out of bounds.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> &[i16] {
        let start = self.index_for_ms(start_ms);
        let end = self.index_for_ms(end_ms);
        &self.samples[start.min(end)..end]
    }

    fn index_for_ms(&self, ms: u64) -> usize {
        let index = ms * self.sample_rate as u64 / 1000;
        (index as usize).min(self.samples.len())
    }
}

/// Trait for live audio input devices.
///
/// This trait allows swapping implementations (real microphone vs mock).
pub trait AudioInput: Send {
    /// Start capturing audio from the device.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the device.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever 16-bit PCM samples have accumulated since the last
    /// read. An empty vector means no new audio yet.
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Mock audio input for testing.
///
/// Serves a scripted sequence of sample chunks, one per `read_samples` call,
/// then empty vectors once the script is exhausted. With `repeat_last`, the
/// final chunk is served forever (a speaker who never pauses).
#[derive(Debug, Clone, Default)]
pub struct MockAudioInput {
    chunks: std::collections::VecDeque<Vec<i16>>,
    repeat_last: bool,
    last: Vec<i16>,
    started: bool,
    fail_start: bool,
}

impl MockAudioInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the read script.
    pub fn with_chunk(mut self, samples: Vec<i16>) -> Self {
        self.chunks.push_back(samples);
        self
    }

    /// Serve the last scripted chunk on every read after the script ends.
    pub fn with_repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl AudioInput for MockAudioInput {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(KikitoriError::AudioCapture {
                message: "mock start failure".to_string(),
            });
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                self.last = chunk.clone();
                Ok(chunk)
            }
            None if self.repeat_last => Ok(self.last.clone()),
            None => Ok(Vec::new()),
        }
    }
}
