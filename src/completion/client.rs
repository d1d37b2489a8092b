use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::config::Settings;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerationParams};

/// Remote chat-completion service. The relay only talks to this seam.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Send the conversation and return the first candidate's text.
    async fn complete(&self, messages: &[ChatMessage], params: GenerationParams)
        -> Result<String>;
}

/// Azure OpenAI deployment addressed by endpoint, deployment id and api version.
#[derive(Clone)]
pub struct AzureChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl AzureChatClient {
    pub fn new(settings: &Settings) -> Self {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            settings.resolved_endpoint(),
            settings.deployment_id,
            settings.api_version
        );

        Self {
            client: reqwest::Client::new(),
            url,
            api_key: settings.api_key.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatCompletionClient for AzureChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        let body = ChatCompletionRequest {
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("chat_completion_error: {status}: {text}"));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("malformed chat completion response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("chat completion returned no choices"))?;

        choice
            .message
            .content
            .ok_or_else(|| anyhow!("chat completion returned no content in first choice"))
    }
}
