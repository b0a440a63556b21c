//! Delivery of dispatch envelopes to the GitHub `repository_dispatch` API.
//!
//! Each envelope results in exactly one POST. Responses below 400 count as
//! delivered (GitHub answers `204 No Content`); anything else is reported back
//! with the response body. Nothing is retried here.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use relay_common::config::RelayConfig;
use relay_common::error::RelayError;
use relay_common::types::DispatchEnvelope;

/// Media type pinning the REST API version.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

const USER_AGENT_VALUE: &str = concat!("relay-notifier/", env!("CARGO_PKG_VERSION"));

fn client_build_error(e: reqwest::Error) -> RelayError {
    RelayError::Config(format!("Failed to build HTTP client: {e}"))
}

/// Sends dispatch envelopes to a single repository.
#[derive(Debug, Clone)]
pub struct GithubDispatcher {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl GithubDispatcher {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(client_build_error)?;

        Ok(Self::with_client(client, config))
    }

    /// Use a pre-built client. The client must send the `Accept` and
    /// `User-Agent` headers GitHub expects.
    pub fn with_client(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            client,
            url: config.dispatch_url(),
            token: config.github_token.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one envelope and classify the response.
    pub async fn dispatch(&self, envelope: &DispatchEnvelope) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            // A body that cannot be read fails as a transport error
            let body = response.text().await?;
            tracing::warn!(
                status = status.as_u16(),
                url = %self.url,
                "Dispatch rejected"
            );
            return Err(RelayError::DispatchRejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            status = status.as_u16(),
            event_type = %envelope.event_type,
            instance_id = %envelope.client_payload.instance_id,
            "Dispatch delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_build_error_is_config_error() {
        // Any reqwest error will do; nothing listens on port 1
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();

        let mapped = client_build_error(err);
        assert!(matches!(mapped, RelayError::Config(_)));
        assert_eq!(mapped.stage(), "config");
        assert!(mapped.to_string().contains("Failed to build HTTP client"));
    }
}
