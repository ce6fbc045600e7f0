use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub recognition: RecognitionConfig,
    pub audio: AudioConfig,
    pub live: LiveModeConfig,
}

/// Recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecognitionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub language: String,
    pub chunk_size_ms: u64,
    pub request_timeout_secs: u64,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub vad_threshold: f32,
}

/// Live capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiveModeConfig {
    pub listen_timeout_ms: u64,
    pub max_phrase_ms: u64,
    pub silence_duration_ms: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            chunk_size_ms: defaults::CHUNK_SIZE_MS,
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            vad_threshold: defaults::VAD_THRESHOLD,
        }
    }
}

impl Default for LiveModeConfig {
    fn default() -> Self {
        Self {
            listen_timeout_ms: defaults::LISTEN_TIMEOUT_MS,
            max_phrase_ms: defaults::MAX_PHRASE_MS,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file
    /// doesn't exist.
    ///
    /// Invalid TOML is still an error; only a missing file falls back.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - KIKITORI_LANGUAGE → recognition.language
    /// - KIKITORI_ENDPOINT → recognition.endpoint
    /// - KIKITORI_API_KEY → recognition.api_key
    /// - KIKITORI_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("KIKITORI_LANGUAGE")
            && !language.is_empty()
        {
            self.recognition.language = language;
        }

        if let Ok(endpoint) = std::env::var("KIKITORI_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.recognition.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("KIKITORI_API_KEY")
            && !api_key.is_empty()
        {
            self.recognition.api_key = Some(api_key);
        }

        if let Ok(device) = std::env::var("KIKITORI_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/kikitori/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> std::path::PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("kikitori")
            .join("config.toml")
    }
}
