//! Redis-backed TTL cache for feed and pricing snapshots.
//!
//! Cache-aside: callers try `get_json`, compute on miss, then `put_json`.
//! A cache outage must never take an endpoint down, so read/write errors
//! degrade to a miss with a warning.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Market snapshots refresh hourly.
pub const MARKET_TTL_SECS: u64 = 3600;
/// Pricing snapshots refresh every 30 minutes.
pub const PRICING_TTL_SECS: u64 = 1800;

/// Fetches and deserializes a cached value. Returns `None` on miss,
/// on a stale/incompatible payload, or when Redis is unreachable.
pub async fn get_json<T: DeserializeOwned>(redis: &redis::Client, key: &str) -> Option<T> {
    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!("Redis unavailable for {key}: {e}");
            return None;
        }
    };

    let raw: Option<String> = match conn.get(key).await {
        Ok(v) => v,
        Err(e) => {
            warn!("Redis read failed for {key}: {e}");
            return None;
        }
    };

    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!("cache hit: {key}");
            Some(value)
        }
        Err(e) => {
            warn!("Discarding undecodable cache entry {key}: {e}");
            None
        }
    }
}

/// Serializes and stores a value under `key` with the given TTL.
pub async fn put_json<T: Serialize>(redis: &redis::Client, key: &str, value: &T, ttl_secs: u64) {
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to serialize cache entry {key}: {e}");
            return;
        }
    };

    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(c) => c,
        Err(e) => {
            warn!("Redis unavailable for {key}: {e}");
            return;
        }
    };

    if let Err(e) = conn.set_ex::<_, _, ()>(key, payload, ttl_secs).await {
        warn!("Redis write failed for {key}: {e}");
    }
}
