pub mod client;
pub mod types;

pub use client::{AzureChatClient, ChatCompletionClient};
pub use types::{ChatMessage, GenerationParams};
