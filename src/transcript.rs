//! Timestamped transcript store and plain-text export.
//!
//! Entries are append-only; their order is insertion order, which both modes
//! guarantee is chronological. A time label is rendered once when the entry
//! is created and never recomputed.

use crate::error::{KikitoriError, Result};
use chrono::{DateTime, Local};
use std::path::Path;

/// One timestamped transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Rendered time label: `MM:SS` offset in file mode, wall-clock
    /// `HH:MM:SS` in live mode.
    pub time_label: String,
    /// Recognized text, or the placeholder for an unrecognized window.
    pub text: String,
}

/// Ordered collection of transcript entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Labels are rendered by the caller at creation time.
    pub fn push(&mut self, time_label: impl Into<String>, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            time_label: time_label.into(),
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries (live-mode `clear` command).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the export format: one `"<label> <text>"` line per entry,
    /// joined by newlines, no trailing newline.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}", e.time_label, e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the export format to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text()).map_err(|e| KikitoriError::Export {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Render a millisecond offset as a zero-padded `MM:SS` label.
///
/// The minutes field widens past 99 rather than wrapping ("123:45").
pub fn format_offset(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Render a wall-clock `HH:MM:SS` label for a live-mode entry.
pub fn format_wall_clock(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Build a timestamped export filename, e.g.
/// `transcription_20250614_093012.txt`.
pub fn export_filename(prefix: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.txt", prefix, at.format("%Y%m%d_%H%M%S"))
}
