use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::ChatMessage;
use shared::completion::{CompletionClient, CompletionError};
use shared::settings::CompletionSettings;
use std::sync::LazyLock;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

/// Client for the local completion endpoint.
pub struct LocalCompletionClient {
    http: Client,
    endpoint: String,
    max_tokens: u32,
}

impl LocalCompletionClient {
    pub fn new(endpoint: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            endpoint: endpoint.into(),
            max_tokens,
        }
    }

    /// Build from resolved settings. Environment and flag overrides are applied
    /// by the caller before this point.
    pub fn from_settings(settings: &CompletionSettings) -> Self {
        Self::new(settings.endpoint.clone(), settings.max_tokens)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for LocalCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let req = self.request_body(prompt);
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&req)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(endpoint = %self.endpoint, %status, "completion endpoint error");
            return Err(CompletionError::Status(status.as_u16()));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        let body: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        tracing::debug!(chars = body.content.chars().count(), "completion received");
        Ok(body.content)
    }
}
