use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

use super::auth::AuthToken;
use crate::core::config::ZeroDbConfig;
use crate::core::errors::ChatError;

/// The interactions store caps prompt excerpts; longer messages still go out
/// in full under `response`.
const PROMPT_EXCERPT_LEN: usize = 500;
const AGENT_ID: &str = "zerodb-chat-demo";

/// One star-rating datapoint forwarded to the RLHF interactions store.
#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub rating: i64,
    pub message_content: String,
    pub message_id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Clone)]
pub struct FeedbackClient {
    base_url: String,
    project_id: String,
    client: Client,
}

impl FeedbackClient {
    pub fn new(config: &ZeroDbConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            client: Client::new(),
        }
    }

    pub async fn record(
        &self,
        token: &AuthToken,
        record: &FeedbackRecord,
    ) -> Result<Value, ChatError> {
        let url = format!(
            "{}/v1/public/{}/database/rlhf/interactions",
            self.base_url, self.project_id
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&token.token)
            .json(&interaction_body(record))
            .send()
            .await
            .map_err(ChatError::network)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::ZeroDb {
                status: status.as_u16(),
                body,
            });
        }

        res.json().await.map_err(ChatError::network)
    }
}

fn interaction_body(record: &FeedbackRecord) -> Value {
    let prompt_excerpt: String = record
        .message_content
        .chars()
        .take(PROMPT_EXCERPT_LEN)
        .collect();
    let timestamp = record
        .timestamp
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    json!({
        "type": "user_feedback",
        "prompt": prompt_excerpt,
        "response": record.message_content,
        "rating": record.rating,
        "metadata": {
            "message_id": record.message_id,
            "timestamp": timestamp,
            "rating_type": "star_rating",
            "agent_id": AGENT_ID,
        },
    })
}
