use std::sync::Arc;

use crate::application::{AdvisorService, InsightsService, RetrieverService};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<AdvisorService>,
    pub retriever: Arc<RetrieverService>,
    pub insights: Arc<InsightsService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        advisor: Arc<AdvisorService>,
        retriever: Arc<RetrieverService>,
        insights: Arc<InsightsService>,
        config: AppConfig,
    ) -> Self {
        Self {
            advisor,
            retriever,
            insights,
            config: Arc::new(config),
        }
    }
}
