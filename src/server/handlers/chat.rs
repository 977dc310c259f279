use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;

use crate::chat::types::parse_chat_request;
use crate::core::errors::ChatError;
use crate::state::AppState;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `POST /api/chat` — one turn through the pipeline.
///
/// The body is taken raw so malformed JSON classifies as a validation
/// failure rather than an extractor rejection. The reply is the generated
/// text; with `stream: true` it is written out fragment by fragment as the
/// upstream model produces it.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ChatError> {
    let payload = parse_chat_request(&body)?;

    if payload.stream {
        let rx = state.pipeline.run_streaming(&payload).await?;
        let fragments = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .map(|item| item.map(|fragment| Bytes::from(fragment.into_bytes())));
        let response = (
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            Body::from_stream(fragments),
        );
        return Ok(response.into_response());
    }

    let text = state.pipeline.run(&payload).await?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response())
}
