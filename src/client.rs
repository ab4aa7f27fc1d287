//! Completion client for the KoboldAI generate endpoint

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfig, SamplerParams};
use crate::error::{ResponseFormatError, Result, TransportError};
use crate::stop::enforce_stop_sequences;

/// Client for a KoboldAI-compatible text generation service
///
/// Holds an immutable [`GenerationConfig`] and performs one request/response
/// round trip per [`complete`](KoboldClient::complete) call. No per-call
/// state is kept between invocations, so a client may be shared across tasks
/// and called concurrently without coordination.
pub struct KoboldClient {
    http: reqwest::Client,
    config: GenerationConfig,
}

impl KoboldClient {
    /// Create a new client for the configured endpoint
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client that reuses an existing HTTP client
    ///
    /// `complete` imposes no timeout of its own; a caller that needs one
    /// builds the `reqwest::Client` with a timeout and passes it in here.
    pub fn with_http_client(config: GenerationConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// The active generation settings
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Identifying name of the backing service
    pub fn provider_name(&self) -> &str {
        "koboldai"
    }

    /// Request a completion for `prompt`.
    ///
    /// Sends the prompt together with the configured sampler settings and
    /// returns the text of the first result in the response. When `stop` is
    /// given, the text is truncated at the earliest occurrence of any stop
    /// sequence; when it is `None` the text is returned unmodified.
    ///
    /// A failed round trip surfaces as [`TransportError`]; a body that is not
    /// the expected envelope surfaces as [`ResponseFormatError`]. Nothing is
    /// retried and no fallback value is ever substituted.
    pub async fn complete(&self, prompt: &str, stop: Option<&[String]>) -> Result<String> {
        let request = GenerateRequest {
            prompt,
            params: self.config.sampler_params(),
        };

        tracing::debug!("sending generate request to {}", self.config.url);

        let response = self
            .http
            .post(&self.config.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!("generate request failed with status {}", status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| TransportError::Network {
            message: e.to_string(),
        })?;

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ResponseFormatError::InvalidJson {
                message: e.to_string(),
            })?;

        let text = parsed
            .results
            .into_iter()
            .next()
            .ok_or(ResponseFormatError::EmptyResults)?
            .text;

        tracing::debug!("received {} bytes of generated text", text.len());

        Ok(match stop {
            Some(stop) => enforce_stop_sequences(&text, stop),
            None => text,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    #[serde(flatten)]
    params: SamplerParams,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    results: Vec<GenerationResult>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    text: String,
}
