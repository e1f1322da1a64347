//! Remote email-generation service boundary.

mod client;

pub use client::GenerationClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Request timed out")]
    Timeout,
}

/// The generation service as the session sees it: a URL in, an email body
/// out, and an opaque failure otherwise.
#[async_trait]
pub trait GenerateService: Send + Sync {
    async fn generate(&self, url: &str) -> Result<String, ServiceError>;
}
