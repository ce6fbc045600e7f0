//! Command-line interface for kikitori
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Timestamped speech-to-text for meeting notes
#[derive(Parser, Debug)]
#[command(
    name = "kikitori",
    version,
    about = "Timestamped speech-to-text for meeting notes",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress detail, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recognition language, by name or code (e.g. Japanese, en-US)
    #[arg(long, global = true, value_name = "LANG")]
    pub language: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe an audio file (mp3, wav, ogg, flac, m4a)
    File {
        /// Audio file to transcribe
        path: PathBuf,

        /// Window size for recognition requests (default: 60s). Examples: 90s, 2m
        #[arg(long, short = 'c', value_name = "DURATION", value_parser = parse_duration_ms)]
        chunk_size: Option<u64>,

        /// Write the transcript to this path (default: transcription_<timestamp>.txt)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Print the transcript without writing an export file
        #[arg(long)]
        no_save: bool,
    },

    /// Transcribe live from the microphone until Ctrl-C
    Live {
        /// Audio input device (e.g., pipewire)
        #[arg(long, value_name = "DEVICE")]
        device: Option<String>,

        /// How long to wait for speech before retrying (default: 5s)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_ms)]
        timeout: Option<u64>,

        /// Maximum length of a single utterance (default: 10s)
        #[arg(long, value_name = "DURATION", value_parser = parse_duration_ms)]
        phrase_limit: Option<u64>,

        /// Write the transcript to this path on exit (default: realtime_transcription_<timestamp>.txt)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,

        /// Discard the transcript on exit instead of writing a file
        #[arg(long)]
        no_save: bool,
    },

    /// List supported recognition languages
    Languages,

    /// List available audio input devices
    #[cfg(feature = "mic")]
    Devices,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Parse a duration string into milliseconds.
///
/// Supports any format accepted by `humantime`: bare numbers (seconds),
/// single-unit (`30s`, `5m`), and compound (`1m30s`).
fn parse_duration_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs * 1000);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}
