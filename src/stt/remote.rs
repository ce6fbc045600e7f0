//! Remote recognition service client.
//!
//! Posts one WAV clip per request to the configured endpoint with the
//! language code as a query parameter, and classifies the response into the
//! tagged `Outcome`. The wire protocol is owned by the service; this client
//! only depends on the response carrying zero or more transcript
//! alternatives per result line.

use crate::defaults;
use crate::stt::recognizer::{Outcome, SpeechRecognizer};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP client for the recognition endpoint.
pub struct RemoteRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteRecognizer {
    /// Create a client for `endpoint`, with a per-request timeout.
    ///
    /// `api_key`, when set, is appended as a `key` query parameter.
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            // Builder only fails on TLS backend misconfiguration; fall back
            // to the default client rather than propagating at construction.
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    /// Create a client with the default endpoint and timeout.
    pub fn with_defaults() -> Self {
        Self::new(defaults::DEFAULT_ENDPOINT, None, defaults::REQUEST_TIMEOUT_SECS)
    }
}

#[async_trait]
impl SpeechRecognizer for RemoteRecognizer {
    async fn recognize(&self, wav_clip: &[u8], language_code: &str) -> Outcome {
        let mut request = self
            .client
            .post(&self.endpoint)
            .query(&[("lang", language_code)])
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(wav_clip.to_vec());

        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Outcome::ServiceUnavailable(e.to_string()),
        };

        if !response.status().is_success() {
            return Outcome::ServiceUnavailable(format!(
                "service returned status {}",
                response.status()
            ));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Outcome::ServiceUnavailable(format!("failed to read response: {}", e));
            }
        };

        parse_response(&body)
    }
}

/// Classify a response body.
///
/// The service emits one JSON object per line, each with a `result` array of
/// `{"alternative": [{"transcript": ...}, ...]}` entries; early lines may
/// carry an empty `result`. The first transcript found wins. A body with
/// only empty results means the audio contained no recognizable speech; a
/// body with no parseable line at all is treated as a service failure.
fn parse_response(body: &str) -> Outcome {
    let mut saw_result = false;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(_) => continue,
        };

        let results = match value.get("result").and_then(|r| r.as_array()) {
            Some(results) => results,
            None => continue,
        };
        saw_result = true;

        for result in results {
            let transcript = result
                .get("alternative")
                .and_then(|a| a.as_array())
                .and_then(|a| a.first())
                .and_then(|alt| alt.get("transcript"))
                .and_then(|t| t.as_str());

            if let Some(text) = transcript {
                let text = text.trim();
                if !text.is_empty() {
                    return Outcome::Recognized(text.to_string());
                }
            }
        }
    }

    if saw_result {
        Outcome::NoSpeech
    } else {
        Outcome::ServiceUnavailable("unexpected response format".to_string())
    }
}
