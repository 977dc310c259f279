use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ChatError;

pub const DEFAULT_SIMILARITY_METRIC: &str = "cosine";

/// One conversation turn. Exactly these two fields go out to the completion
/// API; anything else a client attaches is dropped during sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Validated body of `POST /api/chat`.
#[derive(Debug, Clone)]
pub struct ChatPayload {
    pub messages: Vec<ChatMessage>,
    pub use_rag: bool,
    pub model: Option<String>,
    pub similarity_metric: String,
    pub stream: bool,
}

/// Parse and validate a raw request body.
///
/// Fails fast with `ChatError::Validation` before any network activity: the
/// body must be JSON, `messages` must be a non-empty array, and every message
/// must carry string `role` and `content`. The similarity metric is kept as a
/// free-form string and forwarded to the vector store unvalidated.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatPayload, ChatError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ChatError::validation(format!("request body is not valid JSON: {err}")))?;

    let raw_messages = value
        .get("messages")
        .ok_or_else(|| ChatError::validation("missing field: messages"))?
        .as_array()
        .ok_or_else(|| ChatError::validation("messages must be an array"))?;
    if raw_messages.is_empty() {
        return Err(ChatError::validation("messages must not be empty"));
    }

    let messages = sanitize_messages(raw_messages)?;

    let use_rag = value
        .get("useRag")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let model = value
        .get("llm")
        .and_then(Value::as_str)
        .map(str::to_string);
    let similarity_metric = value
        .get("similarityMetric")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SIMILARITY_METRIC)
        .to_string();
    let stream = value
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(ChatPayload {
        messages,
        use_rag,
        model,
        similarity_metric,
        stream,
    })
}

/// Reduce each inbound message to exactly `role` and `content`.
fn sanitize_messages(raw: &[Value]) -> Result<Vec<ChatMessage>, ChatError> {
    raw.iter()
        .enumerate()
        .map(|(idx, msg)| {
            let role = msg
                .get("role")
                .and_then(Value::as_str)
                .ok_or_else(|| ChatError::validation(format!("message {idx} is missing a role")))?;
            let content = msg
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| ChatError::validation(format!("message {idx} is missing content")))?;
            Ok(ChatMessage {
                role: role.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_json_body() {
        assert!(matches!(
            parse_chat_request(b"not json"),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_messages() {
        let body = br#"{"useRag": true}"#;
        assert!(matches!(
            parse_chat_request(body),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn rejects_non_array_messages() {
        let body = br#"{"messages": "not-an-array"}"#;
        assert!(matches!(
            parse_chat_request(body),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn rejects_empty_messages() {
        let body = br#"{"messages": []}"#;
        assert!(matches!(
            parse_chat_request(body),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn rejects_message_without_content() {
        let body = br#"{"messages": [{"role": "user"}]}"#;
        assert!(matches!(
            parse_chat_request(body),
            Err(ChatError::Validation(_))
        ));
    }

    #[test]
    fn strips_extra_message_fields() {
        let body = br#"{
            "messages": [
                {"role": "user", "content": "hi", "timestamp": 123, "id": "m1"}
            ],
            "useRag": false
        }"#;
        let payload = parse_chat_request(body).unwrap();
        let serialized = serde_json::to_value(&payload.messages[0]).unwrap();
        let mut keys: Vec<&str> = serialized
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["content", "role"]);
    }

    #[test]
    fn defaults_apply_when_fields_absent() {
        let body = br#"{"messages": [{"role": "user", "content": "hi"}]}"#;
        let payload = parse_chat_request(body).unwrap();
        assert!(!payload.use_rag);
        assert!(!payload.stream);
        assert_eq!(payload.model, None);
        assert_eq!(payload.similarity_metric, DEFAULT_SIMILARITY_METRIC);
    }

    #[test]
    fn explicit_fields_are_honored() {
        let body = br#"{
            "messages": [{"role": "user", "content": "What is ZeroDB?"}],
            "useRag": true,
            "llm": "Llama3.3-70B-Instruct",
            "similarityMetric": "euclidean"
        }"#;
        let payload = parse_chat_request(body).unwrap();
        assert!(payload.use_rag);
        assert_eq!(payload.model.as_deref(), Some("Llama3.3-70B-Instruct"));
        assert_eq!(payload.similarity_metric, "euclidean");
    }
}
