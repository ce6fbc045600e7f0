//! Application entry points.
//!
//! Composition roots for the two transcription modes:
//! file: decode → chunk → recognize per window → export
//! live: capture → recognize per utterance → export on exit

use crate::audio::decode::decode_file;
use crate::config::Config;
use crate::defaults;
use crate::error::{KikitoriError, Result};
use crate::language::Language;
use crate::pipeline::{FilePipeline, FilePipelineConfig, NullProgress, ProgressSink};
use crate::stt::RemoteRecognizer;
use crate::transcript::{Transcript, export_filename};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

#[cfg(feature = "mic")]
use crate::audio::capture::MicInput;
#[cfg(feature = "mic")]
use crate::live::{CycleOutcome, LiveConfig, LiveSession};
#[cfg(feature = "mic")]
use std::sync::Arc;
#[cfg(feature = "mic")]
use std::sync::atomic::{AtomicBool, Ordering};

/// Resolve the effective language code from the CLI override and the
/// configured value. Both accept a display name or a locale code.
fn resolve_language(cli_language: Option<&str>, configured: &str) -> Result<String> {
    let raw = cli_language.unwrap_or(configured);
    let language: Language = raw
        .parse()
        .map_err(|message| KikitoriError::ConfigInvalidValue {
            key: "recognition.language".to_string(),
            message,
        })?;
    Ok(language.code().to_string())
}

/// Progress bar sink for file-mode transcription.
struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    fn new() -> Self {
        Self { bar: None }
    }

    fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn report(&mut self, completed: usize, total: usize) {
        let bar = self.bar.get_or_insert_with(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                // SAFETY: hardcoded template string — always valid
                #[allow(clippy::expect_used)]
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} windows ({eta})")
                    .expect("hardcoded progress bar template")
                    .progress_chars("#>-"),
            );
            pb
        });
        bar.set_position(completed as u64);
    }
}

/// Print transcript entries to stdout, timestamps dimmed.
fn render_transcript(transcript: &Transcript) {
    for entry in transcript.entries() {
        println!("{} {}", entry.time_label.dimmed(), entry.text);
    }
}

/// Run the file command: decode an audio file, transcribe it window by
/// window, print the result, and write the export.
///
/// # Arguments
/// * `config` - Base configuration (overridden by CLI args where given)
/// * `path` - Audio file to transcribe
/// * `chunk_size_ms` - Optional window-size override from the CLI
/// * `language` - Optional language override from the CLI
/// * `output` - Optional export path; defaults to a timestamped filename
/// * `no_save` - Skip writing the export file
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level
#[allow(clippy::too_many_arguments)]
pub async fn run_file_command(
    config: Config,
    path: &Path,
    chunk_size_ms: Option<u64>,
    language: Option<&str>,
    output: Option<PathBuf>,
    no_save: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    let language_code = resolve_language(language, &config.recognition.language)?;
    let chunk_size_ms = chunk_size_ms.unwrap_or(config.recognition.chunk_size_ms);

    if !quiet {
        let size_mb = std::fs::metadata(path)
            .map(|m| m.len() as f64 / 1024.0 / 1024.0)
            .unwrap_or(0.0);
        eprintln!("Transcribing {} ({:.2} MB)...", path.display(), size_mb);
    }

    let buffer = decode_file(path)?;

    if verbosity >= 1 {
        eprintln!(
            "Decoded {:.1}s of audio at {}Hz, {}ms windows",
            buffer.duration_ms() as f64 / 1000.0,
            buffer.sample_rate(),
            chunk_size_ms
        );
    }

    let recognizer = RemoteRecognizer::new(
        &config.recognition.endpoint,
        config.recognition.api_key.as_deref(),
        config.recognition.request_timeout_secs,
    );
    let pipeline = FilePipeline::new(
        &recognizer,
        FilePipelineConfig {
            chunk_size_ms,
            language_code,
        },
    );

    let transcript = if quiet {
        pipeline.run(&buffer, &mut NullProgress).await?
    } else {
        let mut progress = TerminalProgress::new();
        let result = pipeline.run(&buffer, &mut progress).await;
        progress.finish();
        result?
    };

    if transcript.is_empty() {
        if !quiet {
            eprintln!("{}", "No transcription results.".yellow());
        }
        return Ok(());
    }

    render_transcript(&transcript);

    if !no_save {
        let export_path = output.unwrap_or_else(|| {
            PathBuf::from(export_filename(defaults::FILE_EXPORT_PREFIX, Local::now()))
        });
        transcript.write_to(&export_path)?;
        if !quiet {
            eprintln!("Transcript saved to {}", export_path.display());
        }
    }

    Ok(())
}

/// Run the live command: capture utterances from the microphone until
/// Ctrl-C, printing each recognized entry as it arrives.
#[cfg(feature = "mic")]
#[allow(clippy::too_many_arguments)]
pub async fn run_live_command(
    mut config: Config,
    device: Option<String>,
    timeout_ms: Option<u64>,
    phrase_limit_ms: Option<u64>,
    language: Option<&str>,
    output: Option<PathBuf>,
    no_save: bool,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    let language_code = resolve_language(language, &config.recognition.language)?;
    if let Some(d) = device {
        config.audio.device = Some(d);
    }

    let live_config = LiveConfig {
        listen_timeout_ms: timeout_ms.unwrap_or(config.live.listen_timeout_ms),
        max_phrase_ms: phrase_limit_ms.unwrap_or(config.live.max_phrase_ms),
        silence_duration_ms: config.live.silence_duration_ms,
        vad_threshold: config.audio.vad_threshold,
        sample_rate: config.audio.sample_rate,
        language_code,
    };

    let mut input = MicInput::new(config.audio.device.as_deref())?;
    let recognizer = RemoteRecognizer::new(
        &config.recognition.endpoint,
        config.recognition.api_key.as_deref(),
        config.recognition.request_timeout_secs,
    );

    let mut session = LiveSession::new();
    session.start();

    // Stop takes effect between cycles, never mid-capture.
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                running.store(false, Ordering::SeqCst);
            }
        });
    }

    if !quiet {
        eprintln!("Listening... speak into the microphone (Ctrl-C to stop).");
    }

    while running.load(Ordering::SeqCst) {
        match session
            .run_cycle(&mut input, &recognizer, &live_config)
            .await
        {
            Ok(CycleOutcome::Recognized) => {
                if let Some(entry) = session.transcript().entries().last() {
                    println!("{} {}", entry.time_label.dimmed(), entry.text);
                }
            }
            Ok(CycleOutcome::NoSpeech) => {
                if verbosity >= 1 {
                    eprintln!("Utterance not recognized, still listening...");
                }
            }
            Ok(CycleOutcome::ListenTimeout) => {
                if !quiet {
                    eprintln!("{}", "No speech detected. Try again.".yellow());
                }
            }
            Ok(CycleOutcome::Idle) => break,
            // An outage fails this cycle only; the next utterance may succeed.
            Err(KikitoriError::ServiceUnavailable { detail }) => {
                eprintln!("{} {}", "Recognition failed:".red(), detail);
            }
            Err(e) => return Err(e),
        }
    }

    session.stop();

    if session.transcript().is_empty() {
        if !quiet {
            eprintln!("{}", "No transcription results.".yellow());
        }
        return Ok(());
    }

    if !no_save {
        let export_path = output.unwrap_or_else(|| {
            PathBuf::from(export_filename(defaults::LIVE_EXPORT_PREFIX, Local::now()))
        });
        session.transcript().write_to(&export_path)?;
        if !quiet {
            eprintln!("Transcript saved to {}", export_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_language_prefers_cli_override() {
        let code = resolve_language(Some("English"), "ja-JP").unwrap();
        assert_eq!(code, "en-US");
    }

    #[test]
    fn resolve_language_falls_back_to_config() {
        let code = resolve_language(None, "German").unwrap();
        assert_eq!(code, "de-DE");

        let code = resolve_language(None, "ko-KR").unwrap();
        assert_eq!(code, "ko-KR");
    }

    #[test]
    fn resolve_language_rejects_unknown() {
        let result = resolve_language(None, "tlh");
        assert!(matches!(
            result,
            Err(KikitoriError::ConfigInvalidValue { .. })
        ));
    }
}
