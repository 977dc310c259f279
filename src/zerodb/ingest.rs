//! Knowledge-base seeding via the embed-and-store endpoint.
//!
//! Documents go up as plain text and are embedded server-side; this path
//! authenticates with the static project API key rather than a login
//! exchange.

use std::fs;
use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::config::ZeroDbConfig;
use crate::core::errors::ChatError;

pub const BATCH_SIZE: usize = 10;

/// One source record from the seed corpus file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Document shape accepted by the embed-and-store endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct IngestDocument {
    pub id: String,
    pub text: String,
    pub metadata: Value,
}

impl IngestDocument {
    pub fn from_record(record: &SeedRecord, similarity_metric: &str) -> Self {
        Self {
            id: format!("doc_{}", Uuid::new_v4()),
            text: format!("{}\n\n{}", record.title, record.content),
            metadata: json!({
                "title": record.title,
                "url": record.url,
                "source": "seed_corpus",
                "similarity_metric": similarity_metric,
            }),
        }
    }
}

/// Outcome of one embed-and-store batch.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestReceipt {
    #[serde(default)]
    pub vectors_stored: u64,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
}

pub fn load_seed_records(path: &Path) -> anyhow::Result<Vec<SeedRecord>> {
    let contents = fs::read_to_string(path)?;
    let records: Vec<SeedRecord> = serde_json::from_str(&contents)?;
    Ok(records)
}

pub struct IngestClient {
    base_url: String,
    project_id: String,
    namespace: String,
    api_key: String,
    client: Client,
}

impl IngestClient {
    pub fn new(config: &ZeroDbConfig, api_key: String) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            namespace: config.namespace.clone(),
            api_key,
            client: Client::new(),
        }
    }

    pub async fn store_batch(
        &self,
        documents: &[IngestDocument],
    ) -> Result<IngestReceipt, ChatError> {
        let url = format!(
            "{}/v1/public/{}/embeddings/embed-and-store",
            self.base_url, self.project_id
        );

        let body = json!({
            "documents": documents,
            "namespace": self.namespace,
            "upsert": true,
        });

        let res = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(&body)
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
