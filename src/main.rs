use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use travelbuddy::api::AppState;
use travelbuddy::{
    AmadeusClient, ChatCompletionClient, LanguageModel, PersistentCache, TravelBuddyConfig, TravelPlanner, VERSION,
    telemetry, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = TravelBuddyConfig::load()?;
    let _telemetry = telemetry::init(&config.logging)?;
    info!("Starting TravelBuddy {VERSION}");

    let cache_dir = config.cache.resolved_location();
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
    let cache = Arc::new(PersistentCache::open(&cache_dir)?);

    let amadeus = Arc::new(AmadeusClient::new(&config.amadeus)?);
    info!("Using Amadeus at {}", amadeus.base_url());
    let llm: Arc<dyn LanguageModel> = Arc::new(ChatCompletionClient::new(&config.llm)?);

    let planner = Arc::new(TravelPlanner::new(&config, amadeus.clone(), llm, cache));
    info!(stages = ?planner.stages(), "Pipeline ready");

    web::run(&config.server, AppState { planner, amadeus }).await
}
