use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ChatError;
use crate::state::AppState;
use crate::zerodb::FeedbackRecord;

#[derive(Debug, Deserialize)]
pub struct FeedbackPayload {
    pub rating: Option<i64>,
    #[serde(rename = "messageContent")]
    pub message_content: Option<String>,
    #[serde(rename = "messageId")]
    pub message_id: Option<String>,
    pub timestamp: Option<String>,
}

/// `POST /api/feedback` — forward a star rating to the RLHF interactions
/// store.
pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FeedbackPayload>,
) -> Result<impl IntoResponse, ChatError> {
    let rating = payload
        .rating
        .ok_or_else(|| ChatError::validation("missing field: rating"))?;
    if !(1..=5).contains(&rating) {
        return Err(ChatError::validation("rating must be between 1 and 5"));
    }

    let record = FeedbackRecord {
        rating,
        message_content: payload.message_content.unwrap_or_default(),
        message_id: payload.message_id,
        timestamp: payload.timestamp,
    };

    let token = state.auth.acquire_token().await?;
    let data = state.feedback.record(&token, &record).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Feedback collected successfully",
        "data": data,
    })))
}
