//! Semantic search against the knowledge-base namespace.
//!
//! The query goes up as plain text; ZeroDB generates the embedding remotely
//! with the model named in the request.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::AuthToken;
use crate::core::config::ZeroDbConfig;
use crate::core::errors::ChatError;

const RESULT_LIMIT: usize = 5;
const SIMILARITY_THRESHOLD: f64 = 0.7;
pub const EMBEDDING_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// One match from the search endpoint.
///
/// Older index entries carry their content under `document`, newer ones under
/// `text`; `resolved_text` is the only place that precedence lives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl SearchResult {
    /// Content of this match: `text` first, then `document`, else empty.
    pub fn resolved_text(&self) -> &str {
        self.text
            .as_deref()
            .or(self.document.as_deref())
            .unwrap_or("")
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Similarity search scoped to the configured project and namespace.
    ///
    /// The metric is forwarded verbatim as filter metadata; the remote
    /// service owns rejecting values it does not understand. An empty query
    /// is still sent for the same reason.
    async fn search(
        &self,
        token: &AuthToken,
        query: &str,
        similarity_metric: &str,
    ) -> Result<Vec<SearchResult>, ChatError>;
}

#[derive(Clone)]
pub struct ZeroDbSearchClient {
    base_url: String,
    project_id: String,
    namespace: String,
    client: Client,
}

impl ZeroDbSearchClient {
    pub fn new(config: &ZeroDbConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            namespace: config.namespace.clone(),
            client: Client::new(),
        }
    }

    fn request_body(&self, query: &str, similarity_metric: &str) -> Value {
        json!({
            "query": query,
            "project_id": self.project_id,
            "limit": RESULT_LIMIT,
            "threshold": SIMILARITY_THRESHOLD,
            "namespace": self.namespace,
            "filter_metadata": { "similarity_metric": similarity_metric },
            "model": EMBEDDING_MODEL,
        })
    }
}

#[async_trait]
impl VectorSearch for ZeroDbSearchClient {
    async fn search(
        &self,
        token: &AuthToken,
        query: &str,
        similarity_metric: &str,
    ) -> Result<Vec<SearchResult>, ChatError> {
        let url = format!(
            "{}/v1/public/{}/embeddings/search",
            self.base_url, self.project_id
        );

        let res = self
            .client
            .post(&url)
            .bearer_auth(&token.token)
            .json(&self.request_body(query, similarity_metric))
            .send()
            .await
            .map_err(ChatError::network)?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Retrieval {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = res.json().await.map_err(ChatError::network)?;
        Ok(payload.results)
    }
}
