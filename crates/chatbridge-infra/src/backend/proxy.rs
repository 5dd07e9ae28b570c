//! ProxyBackend -- [`AskBackend`] over a conversation proxy HTTP API.
//!
//! Each question is one JSON POST to the configured endpoint. The proxy keeps
//! the conversation memory; the bridge only echoes the continuation ids it
//! got back from the previous turn.
//!
//! The API key is wrapped in [`SecretString`] and only exposed when building
//! the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use chatbridge_core::backend::AskBackend;
use chatbridge_types::backend::{AskRequest, AskResponse, BackendError};
use chatbridge_types::config::BackendConfig;

use super::types::{ProxyRequest, ProxyResponse};

pub struct ProxyBackend {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ProxyBackend {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.expose_secret().is_empty()),
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(
            config.proxy_api_server.clone(),
            Some(SecretString::from(config.api_key.clone())),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// No Debug derive: keeps the key out of `{:?}` output entirely.

impl AskBackend for ProxyBackend {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let body = ProxyRequest::from(request);

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => BackendError::AuthenticationFailed,
                429 => BackendError::RateLimited,
                code => BackendError::Status {
                    status: code,
                    body: error_body,
                },
            });
        }

        let proxy_resp: ProxyResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(format!("failed to parse response: {e}")))?;

        tracing::debug!(
            conversation_id = %proxy_resp.conversation_id,
            message_id = %proxy_resp.message_id,
            "proxy answered"
        );
        proxy_resp.into_ask_response()
    }
}
