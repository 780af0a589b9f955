//! Server-side image fetching for clients that cannot load third-party
//! image hosts directly.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Url;

use crate::ProviderError;

/// User agent sent upstream; some image hosts reject blank agents.
pub const PROXY_USER_AGENT: &str = "Mozilla/5.0 (compatible; Augur/1.0)";

/// Content type assumed when the upstream omits one.
const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// An image body fetched from upstream.
#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches remote images over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct ImageProxy {
    client: reqwest::Client,
}

impl ImageProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch `url`. Only `http` and `https` URLs are followed.
    pub async fn fetch(&self, url: &str) -> Result<ProxiedImage, ProviderError> {
        let url = Url::parse(url)
            .map_err(|e| ProviderError::Other(format!("Invalid image URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::Other(format!(
                "Unsupported image URL scheme: {}",
                url.scheme()
            )));
        }

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, PROXY_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UpstreamStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        tracing::debug!(%content_type, size = bytes.len(), "Proxied image");
        Ok(ProxiedImage {
            bytes,
            content_type,
        })
    }
}
