use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::classifier::llm_client::LlmClient;
use crate::configuration::Settings;
use crate::extractor::BrowserPool;
use crate::store::Store;

/// The explicit shared-state object threaded through the HTTP API and the
/// Scheduler, per §5's "Global mutable state ... expose as explicit context
/// object" design note.
pub struct AppContext {
    pub store: Store,
    pub settings: Settings,
    pub browser_pool: Arc<BrowserPool>,
    pub llm_client: Arc<LlmClient>,
    pub http_client: reqwest::Client,
    pub aggregator: Arc<Aggregator>,
}

impl AppContext {
    pub fn new(store: Store, settings: Settings) -> anyhow::Result<Self> {
        let browser_pool = Arc::new(BrowserPool::launch(settings.concurrency.p_url)?);
        let llm_client = Arc::new(LlmClient::new(settings.ai.clone()));
        let http_client = reqwest::Client::new();
        let aggregator = Arc::new(Aggregator::new(
            store.clone(),
            settings.aggregation.window_hours,
            settings.aggregation.tracking_param_set(),
        ));

        Ok(Self {
            store,
            settings,
            browser_pool,
            llm_client,
            http_client,
            aggregator,
        })
    }
}
