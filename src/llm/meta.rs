use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::provider::CompletionProvider;
use crate::chat::types::ChatMessage;
use crate::core::config::CompletionConfig;
use crate::core::errors::ChatError;

/// Generation cap forwarded with every completion request.
const MAX_TOKENS: u32 = 1000;
/// Hard wall-clock bound on one completion call; the in-flight request is
/// aborted when it elapses.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Used when neither the request nor the deployment names a model.
pub const FALLBACK_MODEL: &str = "Llama-4-Maverick-17B-128E-Instruct-FP8";

/// Model selection precedence: explicit request field, then the deployment
/// default, then the hardcoded fallback.
pub fn resolve_model<'a>(requested: Option<&'a str>, configured: Option<&'a str>) -> &'a str {
    requested.or(configured).unwrap_or(FALLBACK_MODEL)
}

/// Client for the Meta Llama completion API (OpenAI-compatible).
#[derive(Clone)]
pub struct MetaLlamaClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl MetaLlamaClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn request_body(messages: &[ChatMessage], model_id: &str, stream: bool) -> Value {
    let mut body = json!({
        "model": model_id,
        "messages": messages,
        "max_tokens": MAX_TOKENS,
    });

    if stream {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("stream".to_string(), json!(true));
        }
    }

    body
}

fn classify_send_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::network(err)
    }
}

/// First choice's message content; empty when the shape is missing.
fn extract_content(payload: &Value) -> String {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

enum SseLine {
    Fragment(String),
    Done,
    Ignore,
}

fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    if line.is_empty() {
        return SseLine::Ignore;
    }
    if line == "data: [DONE]" {
        return SseLine::Done;
    }
    if let Some(data) = line.strip_prefix("data: ") {
        if let Ok(event) = serde_json::from_str::<Value>(data) {
            if let Some(content) = event["choices"][0]["delta"]["content"].as_str() {
                if !content.is_empty() {
                    return SseLine::Fragment(content.to_string());
                }
            }
        }
    }
    SseLine::Ignore
}

#[async_trait]
impl CompletionProvider for MetaLlamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<String, ChatError> {
        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body(messages, model_id, false))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Completion {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = res.json().await.map_err(classify_send_error)?;
        Ok(extract_content(&payload))
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
    ) -> Result<mpsc::Receiver<Result<String, ChatError>>, ChatError> {
        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request_body(messages, model_id, true))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Completion {
                status: status.as_u16(),
                body,
            });
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        let chunk = String::from_utf8_lossy(&bytes);
                        for line in chunk.lines() {
                            match parse_sse_line(line) {
                                SseLine::Done => return,
                                SseLine::Fragment(content) => {
                                    if tx.send(Ok(content)).await.is_err() {
                                        return;
                                    }
                                }
                                SseLine::Ignore => {}
                            }
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Err(classify_send_error(err))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
