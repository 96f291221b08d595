use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::market_data::MarketDataFeed;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis backs the TTL caches for feed and pricing snapshots.
    pub redis: RedisClient,
    pub llm: LlmClient,
    /// Pluggable market-data feed. Default: YahooChartFeed against
    /// MARKET_DATA_URL; swapped with a fixture feed in tests.
    pub market: Arc<dyn MarketDataFeed>,
}
