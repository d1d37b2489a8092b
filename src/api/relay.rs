use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    completion::{ChatCompletionClient, GenerationParams},
    prompts::PromptTemplate,
};

pub const PROMPT_REQUIRED: &str = "The prompt is required.";
pub const INTERNAL_ERROR: &str = "Internal server error.";

/// Wraps a user prompt in the few-shot preamble and forwards it to the
/// completion service. One remote call per prompt, never retried.
pub struct CompletionRelay {
    client: Arc<dyn ChatCompletionClient>,
    template: PromptTemplate,
    params: GenerationParams,
}

impl CompletionRelay {
    pub fn new(client: Arc<dyn ChatCompletionClient>, template: PromptTemplate) -> Self {
        Self {
            client,
            template,
            params: GenerationParams::default(),
        }
    }

    pub async fn handle(&self, prompt: &str) -> (StatusCode, String) {
        let request_id = Uuid::new_v4();

        if prompt.trim().is_empty() {
            warn!(%request_id, "rejected completion request with empty prompt");
            return (StatusCode::BAD_REQUEST, PROMPT_REQUIRED.into());
        }

        info!(
            %request_id,
            prompt_chars = prompt.chars().count(),
            "forwarding prompt to chat completion service"
        );

        let messages = self.template.conversation(prompt);
        match self.client.complete(&messages, self.params).await {
            Ok(reply) => {
                info!(%request_id, reply_chars = reply.chars().count(), "completion received");
                (StatusCode::OK, reply)
            }
            Err(err) => {
                error!(%request_id, prompt, error = ?err, "chat completion failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.into())
            }
        }
    }
}
