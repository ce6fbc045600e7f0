//! Recognition language selection.
//!
//! The recognition service accepts a BCP-47 locale code per request. The set
//! below is fixed; one language is selected per run and applied to every
//! window or utterance in that run.

use std::fmt;
use std::str::FromStr;

/// Supported recognition languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Japanese,
    English,
    Chinese,
    Korean,
    French,
    German,
    Spanish,
}

impl Language {
    /// All supported languages, in display order.
    pub const ALL: [Language; 7] = [
        Language::Japanese,
        Language::English,
        Language::Chinese,
        Language::Korean,
        Language::French,
        Language::German,
        Language::Spanish,
    ];

    /// Locale code sent to the recognition service.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "ja-JP",
            Language::English => "en-US",
            Language::Chinese => "zh-CN",
            Language::Korean => "ko-KR",
            Language::French => "fr-FR",
            Language::German => "de-DE",
            Language::Spanish => "es-ES",
        }
    }

    /// Human-readable display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Japanese => "Japanese",
            Language::English => "English",
            Language::Chinese => "Chinese",
            Language::Korean => "Korean",
            Language::French => "French",
            Language::German => "German",
            Language::Spanish => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Parse from a display name ("japanese") or locale code ("ja-JP"),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        for lang in Language::ALL {
            if needle.eq_ignore_ascii_case(lang.name()) || needle.eq_ignore_ascii_case(lang.code())
            {
                return Ok(lang);
            }
        }
        Err(format!(
            "unknown language '{}' (expected one of: {})",
            s,
            Language::ALL
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }
}
