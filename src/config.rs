//! Generation settings and wire parameter mapping

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ConfigError;

/// Default generate endpoint of a local KoboldAI instance
pub const DEFAULT_URL: &str = "http://127.0.0.1:5000/api/v1/generate";

/// Generation settings for the generate endpoint
///
/// Every field has a default, so a config is always fully specified and the
/// whole parameter set is sent with each request. The config is an immutable
/// value; share it by cloning or pass it into a [`KoboldClient`].
///
/// [`KoboldClient`]: crate::KoboldClient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f64,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Total probability mass of tokens to consider at each step
    pub top_p: f64,

    /// Typical sampling mass
    pub typical_p: f64,

    /// Number of highest probability vocabulary tokens to keep
    pub top_k: u32,

    /// Penalty applied to repeated tokens
    pub repetition_penalty: f64,

    /// Generate endpoint URL
    pub url: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.99,
            max_tokens: 256,
            top_p: 0.18,
            typical_p: 1.0,
            top_k: 30,
            repetition_penalty: 1.15,
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl GenerationConfig {
    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of tokens to generate
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the top-p sampling mass
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the typical sampling mass
    pub fn with_typical_p(mut self, typical_p: f64) -> Self {
        self.typical_p = typical_p;
        self
    }

    /// Set the top-k vocabulary truncation width
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the repetition penalty
    pub fn with_repetition_penalty(mut self, repetition_penalty: f64) -> Self {
        self.repetition_penalty = repetition_penalty;
        self
    }

    /// Set the generate endpoint URL
    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }

    /// Build a config from a JSON object holding any subset of the
    /// documented fields.
    ///
    /// The surface is closed: an unrecognized key is rejected rather than
    /// silently ignored. The URL is taken as-is; no well-formedness check is
    /// applied. Performs no I/O.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let fields = value.as_object().ok_or(ConfigError::InvalidFormat)?;
        let mut config = Self::default();

        for (key, value) in fields {
            match key.as_str() {
                "temperature" => config.temperature = float_field(key, value)?,
                "max_tokens" => config.max_tokens = int_field(key, value)?,
                "top_p" => config.top_p = float_field(key, value)?,
                "typical_p" => config.typical_p = float_field(key, value)?,
                "top_k" => config.top_k = int_field(key, value)?,
                "repetition_penalty" => config.repetition_penalty = float_field(key, value)?,
                "url" => {
                    config.url = value
                        .as_str()
                        .ok_or_else(|| ConfigError::InvalidValue {
                            field: key.clone(),
                            message: format!("expected a string, got {value}"),
                        })?
                        .to_string();
                }
                _ => {
                    return Err(ConfigError::UnknownField { field: key.clone() });
                }
            }
        }

        Ok(config)
    }

    /// Map the settings onto the wire field names of the generate endpoint.
    ///
    /// Exactly six entries, values copied verbatim. No clamping, scaling, or
    /// range validation happens here; an out-of-range value is sent as-is.
    pub fn sampler_params(&self) -> SamplerParams {
        SamplerParams {
            temperature: self.temperature,
            max_length: self.max_tokens,
            top_p: self.top_p,
            typical: self.typical_p,
            top_k: self.top_k,
            rep_pen: self.repetition_penalty,
        }
    }

    /// Identifying parameters: the endpoint URL plus the six wire fields.
    ///
    /// Intended for logging and identification; has no effect on request
    /// behavior.
    pub fn identifying_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("url".to_string(), json!(self.url));
        params.insert("temperature".to_string(), json!(self.temperature));
        params.insert("max_length".to_string(), json!(self.max_tokens));
        params.insert("top_p".to_string(), json!(self.top_p));
        params.insert("typical".to_string(), json!(self.typical_p));
        params.insert("top_k".to_string(), json!(self.top_k));
        params.insert("rep_pen".to_string(), json!(self.repetition_penalty));
        params
    }
}

/// The six sampler fields of a generate request, under their wire names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplerParams {
    pub temperature: f64,
    pub max_length: u32,
    pub top_p: f64,
    pub typical: f64,
    pub top_k: u32,
    pub rep_pen: f64,
}

fn float_field(field: &str, value: &Value) -> Result<f64, ConfigError> {
    value.as_f64().ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("expected a number, got {value}"),
    })
}

fn int_field(field: &str, value: &Value) -> Result<u32, ConfigError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("expected an unsigned integer, got {value}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GenerationConfig::default();

        assert_eq!(config.temperature, 1.99);
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.top_p, 0.18);
        assert_eq!(config.typical_p, 1.0);
        assert_eq!(config.top_k, 30);
        assert_eq!(config.repetition_penalty, 1.15);
        assert_eq!(config.url, "http://127.0.0.1:5000/api/v1/generate");
    }

    #[test]
    fn sampler_params_copies_values_verbatim() {
        let config = GenerationConfig::default()
            .with_temperature(99.0)
            .with_top_p(1.5)
            .with_repetition_penalty(0.0);

        let params = serde_json::to_value(config.sampler_params()).unwrap();
        let fields = params.as_object().unwrap();

        assert_eq!(fields.len(), 6);
        assert_eq!(fields["temperature"], json!(99.0));
        assert_eq!(fields["max_length"], json!(256));
        // out-of-range values pass through unchanged
        assert_eq!(fields["top_p"], json!(1.5));
        assert_eq!(fields["typical"], json!(1.0));
        assert_eq!(fields["top_k"], json!(30));
        assert_eq!(fields["rep_pen"], json!(0.0));
    }

    #[test]
    fn identifying_params_adds_the_endpoint_url() {
        let config = GenerationConfig::default().with_url("http://example.com/generate");
        let params = config.identifying_params();

        assert_eq!(params.len(), 7);
        assert_eq!(params["url"], json!("http://example.com/generate"));
        assert_eq!(params["temperature"], json!(1.99));
        assert_eq!(params["rep_pen"], json!(1.15));
    }

    #[test]
    fn from_value_accepts_any_subset_of_fields() {
        let config = GenerationConfig::from_value(&json!({
            "temperature": 0.7,
            "top_k": 40,
        }))
        .unwrap();

        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_k, 40);
        // everything else keeps its default
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn from_value_rejects_unknown_fields() {
        let error = GenerationConfig::from_value(&json!({"temperture": 0.5})).unwrap_err();

        assert!(matches!(
            error,
            ConfigError::UnknownField { ref field } if field == "temperture"
        ));
    }

    #[test]
    fn from_value_rejects_non_object_input() {
        let error = GenerationConfig::from_value(&json!("temperature=0.5")).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidFormat));
    }

    #[test]
    fn from_value_rejects_wrongly_typed_values() {
        let error = GenerationConfig::from_value(&json!({"max_tokens": "lots"})).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidValue { ref field, .. } if field == "max_tokens"
        ));
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let result = serde_json::from_value::<GenerationConfig>(json!({"max_lenght": 64}));
        assert!(result.is_err());
    }
}
