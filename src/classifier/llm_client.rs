use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::configuration::AiSettings;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("llm returned a client error: {status}")]
    ClientError { status: u16 },
    #[error("llm response was not the expected chat-completion shape")]
    MalformedResponse,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

/// Thin client over one OpenAI-compatible `/chat/completions` endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    settings: AiSettings,
}

impl LlmClient {
    pub fn new(settings: AiSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .expect("failed to build llm http client");
        Self { client, settings }
    }

    /// Sends one prompt, retrying transport errors and 5xx responses with
    /// exponential backoff; a 4xx is treated as fatal for this item.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            stream: false,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let attempt = || async {
            let response = self
                .client
                .post(&self.settings.api_url)
                .bearer_auth(self.settings.api_key.expose_secret())
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_client_error() {
                return Err(LlmError::ClientError {
                    status: status.as_u16(),
                });
            }
            let response = response.error_for_status().map_err(LlmError::Transport)?;
            let value: Value = response.json().await.map_err(LlmError::Transport)?;
            Ok(value)
        };

        let value: Value = attempt
            .retry(
                ExponentialBuilder::default().with_max_times(self.settings.max_retries as usize),
            )
            .when(|e| matches!(e, LlmError::Transport(_)))
            .await?;

        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or(LlmError::MalformedResponse)
    }
}
