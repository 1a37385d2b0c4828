//! Completion service integration

mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Message;
use crate::tools::ToolDefinition;

pub use openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Seam between the chat engine and the completion endpoint.
///
/// `tools` is the catalogue offered for this call; passing `None`
/// withholds tools entirely, which is how the final call of a tool
/// round prevents unbounded chained calls.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<Message, ProviderError>;
}
