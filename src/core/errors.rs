use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure classification for the chat pipeline.
///
/// Upstream response bodies ride along on `Retrieval`/`Completion` for
/// diagnostics; `IntoResponse` logs them and reports only the classification
/// and status to the client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("vector store authentication failed with status {status}")]
    Authentication { status: u16 },
    #[error("vector search failed with status {status}")]
    Retrieval { status: u16, body: String },
    #[error("completion request timed out")]
    Timeout,
    #[error("completion failed with status {status}")]
    Completion { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Network(String),
    #[error("zerodb request failed with status {status}")]
    ZeroDb { status: u16, body: String },
}

impl ChatError {
    pub fn validation<M: Into<String>>(msg: M) -> Self {
        ChatError::Validation(msg.into())
    }

    pub fn network<E: std::fmt::Display>(err: E) -> Self {
        ChatError::Network(err.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ChatError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ChatError::Authentication { status } => {
                tracing::error!("vector store login rejected with status {}", status);
                (
                    StatusCode::BAD_GATEWAY,
                    "vector store authentication failed".to_string(),
                )
            }
            ChatError::Retrieval { status, body } => {
                tracing::error!("vector search rejected with status {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("vector search failed with status {}", status),
                )
            }
            ChatError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "completion request timed out".to_string(),
            ),
            ChatError::Completion { status, body } => {
                tracing::error!("completion rejected with status {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("completion failed with status {}", status),
                )
            }
            ChatError::Network(msg) => {
                tracing::error!("transport failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream request failed".to_string(),
                )
            }
            ChatError::ZeroDb { status, body } => {
                tracing::error!("zerodb request rejected with status {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("zerodb request failed with status {}", status),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
