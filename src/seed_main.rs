use std::env;
use std::path::PathBuf;

use anyhow::Context;

use zerochat_backend::core::config::{default_log_dir, ZeroDbConfig};
use zerochat_backend::core::logging;
use zerochat_backend::zerodb::ingest::{self, IngestClient, IngestDocument};

const DEFAULT_CORPUS_PATH: &str = "data/sample_data.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ZeroDbConfig::from_env().context("Failed to load configuration from environment")?;
    logging::init(&default_log_dir());

    let api_key = config
        .api_key
        .clone()
        .context("ZERODB_API_KEY is required for seeding")?;
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_PATH));

    let records = ingest::load_seed_records(&path)
        .with_context(|| format!("Failed to read seed corpus from {}", path.display()))?;
    tracing::info!(
        count = records.len(),
        namespace = %config.namespace,
        "Seeding knowledge base"
    );

    let documents: Vec<IngestDocument> = records
        .iter()
        .map(|record| IngestDocument::from_record(record, "cosine"))
        .collect();

    let client = IngestClient::new(&config, api_key);
    let mut stored = 0u64;
    for (idx, batch) in documents.chunks(ingest::BATCH_SIZE).enumerate() {
        match client.store_batch(batch).await {
            Ok(receipt) => {
                stored += receipt.vectors_stored;
                tracing::info!(
                    batch = idx + 1,
                    vectors = receipt.vectors_stored,
                    elapsed_ms = ?receipt.processing_time_ms,
                    "Batch stored"
                );
            }
            Err(err) => {
                tracing::warn!(batch = idx + 1, "Batch failed: {}", err);
            }
        }
    }

    tracing::info!(total = documents.len(), stored, "Seeding complete");
    Ok(())
}
