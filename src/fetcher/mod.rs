//! Asset fetcher: raw byte retrieval over HTTP with status validation.
//!
//! The pipeline fetches two independent assets per submission (the submitted
//! screenshot and the community emblem); the fetcher is stateless apart from
//! its connection pool, so both fetches may run concurrently. No fetch is
//! retried: a transport failure or non-2xx status is surfaced immediately as
//! a terminal failure for that submission.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;

/// Which remote asset a fetch was for. Carried in errors so operators can
/// tell the two apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Submission,
    Emblem,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Submission => write!(f, "submitted image"),
            Asset::Emblem => write!(f, "community emblem"),
        }
    }
}

/// Typed fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("unexpected status: {0}")]
    Status(u16),
}

/// Byte-fetching seam. The pipeline depends on this trait so tests can run
/// without a network.
#[async_trait]
pub trait FetchBytes: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// HTTP asset fetcher with a bounded per-request timeout.
#[derive(Clone)]
pub struct AssetFetcher {
    client: reqwest::Client,
}

impl AssetFetcher {
    /// Build a fetcher with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the HTTP client cannot be created
    /// (e.g., TLS backend initialization failure).
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchBytes for AssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
