use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::chat::types::ChatMessage;
use crate::core::errors::ChatError;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// chat completion (non-streaming); returns the generated text
    async fn complete(&self, messages: &[ChatMessage], model_id: &str)
        -> Result<String, ChatError>;

    /// chat completion (streaming); fragments arrive in generation order and
    /// the channel closes when the upstream stream ends
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<mpsc::Receiver<Result<String, ChatError>>, ChatError>;
}
