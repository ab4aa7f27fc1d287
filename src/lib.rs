//! # kobold-client
//!
//! Client library for KoboldAI-compatible text generation APIs.
//!
//! This library provides a small completion client: send a prompt to a
//! `/api/v1/generate` endpoint together with a fixed set of sampler settings
//! and get back the generated text, optionally truncated at caller-supplied
//! stop sequences.
//!
//! ```no_run
//! use kobold_client::{GenerationConfig, KoboldClient};
//!
//! # async fn example() -> kobold_client::Result<()> {
//! let client = KoboldClient::new(GenerationConfig::default());
//! let text = client.complete("Tell me a joke.", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod stop;

pub use client::KoboldClient;
pub use config::{GenerationConfig, SamplerParams};
pub use error::{ConfigError, Error, ResponseFormatError, Result, TransportError};
pub use stop::enforce_stop_sequences;

/// Current version of the kobold-client library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
