use std::sync::Arc;

use crate::chat::ChatPipeline;
use crate::core::config::AppConfig;
use crate::llm::{CompletionProvider, MetaLlamaClient};
use crate::zerodb::{
    FeedbackClient, TokenProvider, VectorSearch, ZeroDbAuthClient, ZeroDbSearchClient,
};

/// Shared application state: the configuration plus the clients behind the
/// pipeline seams. Everything here is immutable after startup; per-request
/// state (tokens, search results) never lands in it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: ChatPipeline,
    pub auth: Arc<dyn TokenProvider>,
    pub feedback: FeedbackClient,
}

impl AppState {
    /// Wire the production HTTP clients.
    pub fn initialize(config: AppConfig) -> Arc<Self> {
        let auth: Arc<dyn TokenProvider> = Arc::new(ZeroDbAuthClient::new(&config.zerodb));
        let search: Arc<dyn VectorSearch> = Arc::new(ZeroDbSearchClient::new(&config.zerodb));
        let completion: Arc<dyn CompletionProvider> =
            Arc::new(MetaLlamaClient::new(&config.completion));
        Self::with_components(config, auth, search, completion)
    }

    /// Assemble state from explicit components.
    pub fn with_components(
        config: AppConfig,
        auth: Arc<dyn TokenProvider>,
        search: Arc<dyn VectorSearch>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Arc<Self> {
        let feedback = FeedbackClient::new(&config.zerodb);
        let pipeline = ChatPipeline::new(
            auth.clone(),
            search,
            completion,
            config.completion.default_model.clone(),
        );

        Arc::new(Self {
            config: Arc::new(config),
            pipeline,
            auth,
            feedback,
        })
    }
}
