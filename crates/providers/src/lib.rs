//! Backends the generation pipeline calls out to.
//!
//! Each collaborator sits behind a trait so the pipeline can be driven by
//! test doubles or alternative services:
//!
//! - [`TextGenerator`] produces the prediction text.
//! - [`ImageGenerator`] produces the meme image; [`generate_or_placeholder`]
//!   turns any failure into a deterministic placeholder.
//! - [`AssetRegistry`] registers the coin, looks up prices and executes
//!   buys. It never returns an error.
//!
//! The default implementations talk to an OpenAI-compatible HTTP API
//! ([`openai`]) and simulate the on-chain registry ([`registry`]).
//! [`ImageProxy`] relays generated images to clients.

pub mod image;
pub mod openai;
pub mod placeholder;
pub mod proxy;
pub mod registry;
pub mod text;

pub use image::{generate_or_placeholder, ImageGenerator, ImageResult, OpenAiImageGenerator};
pub use openai::{OpenAiApi, OpenAiError};
pub use proxy::{ImageProxy, ProxiedImage};
pub use registry::{
    AssetRegistry, RegisterAsset, Registration, RegistryConfig, SimulatedRegistry, TradeResult,
};
pub use text::{GeneratedText, OpenAiTextGenerator, TextGenerator};

/// Errors a fallible backend can report.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP backend failed.
    #[error(transparent)]
    OpenAi(#[from] OpenAiError),

    /// A plain HTTP fetch failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// The backend answered but produced nothing usable.
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    /// Any other backend failure.
    #[error("Provider error: {0}")]
    Other(String),
}
