//! HTTP client for the generation backend.

use crate::service::{GenerateService, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    email: String,
}

/// Client for the `POST /generate-email` endpoint.
#[derive(Debug)]
pub struct GenerationClient {
    client: reqwest::Client,
    base_url: String,
}

impl GenerationClient {
    /// Create a client with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GenerateService for GenerationClient {
    async fn generate(&self, url: &str) -> Result<String, ServiceError> {
        let endpoint = format!("{}/generate-email", self.base_url.trim_end_matches('/'));
        debug!(%endpoint, "requesting email generation");

        let response = self
            .client
            .post(&endpoint)
            .json(&GenerateRequest { url })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(ServiceError::Api(format!("HTTP {status}: {text}")));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::Api(format!("Failed to parse response: {e}")))?;

        debug!(chars = parsed.email.len(), "generation succeeded");
        Ok(parsed.email)
    }
}

fn map_transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else {
        ServiceError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        let json = serde_json::to_string(&GenerateRequest {
            url: "https://a.com",
        })
        .unwrap();
        assert_eq!(json, r#"{"url":"https://a.com"}"#);
    }

    #[test]
    fn response_wire_format() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"email":"Dear team,\n..."}"#).unwrap();
        assert_eq!(parsed.email, "Dear team,\n...");
    }

    #[test]
    fn response_ignores_extra_fields() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"email":"Hi","model":"x"}"#).unwrap();
        assert_eq!(parsed.email, "Hi");
    }

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let client = GenerationClient::new("http://localhost:5000/", Duration::from_secs(5));
        assert_eq!(client.base_url.trim_end_matches('/'), "http://localhost:5000");
    }
}
