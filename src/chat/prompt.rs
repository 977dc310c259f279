//! Prompt assembly.
//!
//! Builds the system message that fronts every completion request: a fixed
//! domain preamble, the retrieved context between literal markers, and a
//! fallback instruction for questions the context does not cover.

use crate::chat::types::ChatMessage;
use crate::zerodb::SearchResult;

const SYSTEM_ROLE: &str = "system";

/// Newline-joined content of every result; empty when there are none.
pub fn build_context_block(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| result.resolved_text().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// System message embedding the context block.
///
/// The `START CONTEXT`/`END CONTEXT` markers and the instructions are emitted
/// even when the block is empty, so the model always sees the same frame.
pub fn build_system_message(context_block: &str) -> ChatMessage {
    let content = format!(
        "You are an AI assistant for AINative Studio, helping users understand ZeroDB \
and our AI infrastructure services. Format responses using markdown where applicable.\n\
\n\
You specialize in:\n\
- ZeroDB: Our managed vector database with built-in embeddings API\n\
- Embeddings API: Free HuggingFace-based embeddings (BAAI/bge-small-en-v1.5, 384 dimensions)\n\
- Meta Llama integration: How to use Llama models for chat completions\n\
- RAG (Retrieval-Augmented Generation) systems\n\
- Authentication with JWT tokens\n\
\n\
START CONTEXT\n\
{context_block}\n\
END CONTEXT\n\
\n\
If the answer is not provided in the context, say \"I don't have that information \
in my knowledge base, but I can help you find it in the ZeroDB documentation.\""
    );

    ChatMessage {
        role: SYSTEM_ROLE.to_string(),
        content,
    }
}
