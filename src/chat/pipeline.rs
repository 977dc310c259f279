//! The per-turn orchestration pipeline.
//!
//! One chat turn runs Validating → Retrieving (skippable) → Assembling →
//! Dispatching. Validation happens in the handler via
//! `types::parse_chat_request`; this module owns the rest. Any retrieval or
//! dispatch failure aborts the whole turn — there is no fallback to a
//! context-free completion and no re-auth retry on an expired token.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::chat::prompt;
use crate::chat::types::{ChatMessage, ChatPayload};
use crate::core::errors::ChatError;
use crate::llm::{resolve_model, CompletionProvider};
use crate::zerodb::{SearchResult, TokenProvider, VectorSearch};

#[derive(Clone)]
pub struct ChatPipeline {
    auth: Arc<dyn TokenProvider>,
    search: Arc<dyn VectorSearch>,
    completion: Arc<dyn CompletionProvider>,
    default_model: Option<String>,
}

impl ChatPipeline {
    pub fn new(
        auth: Arc<dyn TokenProvider>,
        search: Arc<dyn VectorSearch>,
        completion: Arc<dyn CompletionProvider>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            auth,
            search,
            completion,
            default_model,
        }
    }

    /// Run one turn to completion and return the generated text.
    pub async fn run(&self, payload: &ChatPayload) -> Result<String, ChatError> {
        let results = self.retrieve(payload).await?;
        let messages = self.assemble(payload, &results);
        self.completion
            .complete(&messages, self.model_for(payload))
            .await
    }

    /// Streaming variant: fragments arrive over the channel as generated.
    pub async fn run_streaming(
        &self,
        payload: &ChatPayload,
    ) -> Result<mpsc::Receiver<Result<String, ChatError>>, ChatError> {
        let results = self.retrieve(payload).await?;
        let messages = self.assemble(payload, &results);
        self.completion
            .stream_chat(&messages, self.model_for(payload))
            .await
    }

    /// Retrieval stage: fresh token, then semantic search over the latest
    /// utterance. Skipped entirely when RAG is disabled — neither the token
    /// provider nor the search client is touched.
    async fn retrieve(&self, payload: &ChatPayload) -> Result<Vec<SearchResult>, ChatError> {
        if !payload.use_rag {
            return Ok(Vec::new());
        }

        let query = payload
            .messages
            .last()
            .map(|msg| msg.content.as_str())
            .unwrap_or("");

        let token = self.auth.acquire_token().await?;
        let results = self
            .search
            .search(&token, query, &payload.similarity_metric)
            .await?;
        tracing::debug!(result_count = results.len(), "semantic search complete");
        Ok(results)
    }

    /// System message first, then the sanitized history in original order.
    fn assemble(&self, payload: &ChatPayload, results: &[SearchResult]) -> Vec<ChatMessage> {
        let block = prompt::build_context_block(results);
        let mut messages = Vec::with_capacity(payload.messages.len() + 1);
        messages.push(prompt::build_system_message(&block));
        messages.extend(payload.messages.iter().cloned());
        messages
    }

    fn model_for<'a>(&'a self, payload: &'a ChatPayload) -> &'a str {
        resolve_model(payload.model.as_deref(), self.default_model.as_deref())
    }
}
