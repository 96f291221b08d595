//! Market trends — sector closes through the feed, equal-weight index, and
//! strategic commentary from the model.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache;
use crate::commerce::prompts::{analysis_prompt, MARKET_TRENDS_TASK};
use crate::errors::AppError;
use crate::extraction;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;
use crate::market_data::{
    market_index, summarize, DailyClose, MarketDataFeed, TickerSeries, TickerSummary,
    SECTOR_TICKERS, TREND_WINDOW_DAYS,
};

const SECTOR_CACHE_KEY: &str = "market:sector:30d";

#[derive(Debug, Serialize)]
pub struct MarketTrendsReport {
    pub summaries: Vec<TickerSummary>,
    pub market_index: Vec<DailyClose>,
    pub analysis: String,
}

/// Cached wrapper around the sector fetch; one entry covers all tickers.
#[derive(Debug, Serialize, Deserialize)]
struct SectorSnapshot {
    series: Vec<TickerSeries>,
}

/// Fetches the last 30 days of closes for every sector ticker, consulting the
/// Redis snapshot first.
pub async fn fetch_sector_series(
    feed: &dyn MarketDataFeed,
    redis: &redis::Client,
) -> Result<Vec<TickerSeries>, AppError> {
    if let Some(snapshot) = cache::get_json::<SectorSnapshot>(redis, SECTOR_CACHE_KEY).await {
        return Ok(snapshot.series);
    }

    let end = Utc::now();
    let start = end - Duration::days(TREND_WINDOW_DAYS);

    let mut series = Vec::with_capacity(SECTOR_TICKERS.len());
    for symbol in SECTOR_TICKERS {
        let ticker = feed
            .daily_closes(symbol, start, end)
            .await
            .map_err(|e| AppError::Feed(e.to_string()))?;
        series.push(ticker);
    }

    info!("Fetched {} sector tickers from the feed", series.len());
    cache::put_json(
        redis,
        SECTOR_CACHE_KEY,
        &SectorSnapshot {
            series: series.clone(),
        },
        cache::MARKET_TTL_SECS,
    )
    .await;

    Ok(series)
}

/// Renders the per-ticker stats and index endpoint values the model sees.
pub fn format_market_context(summaries: &[TickerSummary], index: &[DailyClose]) -> String {
    let mut lines = vec![format!(
        "Market data for last {TREND_WINDOW_DAYS} days shows the following trends:"
    )];
    for s in summaries {
        lines.push(format!(
            "{}: min {:.2}, max {:.2}, mean {:.2}, last {:.2}, change {:+.2}%",
            s.symbol, s.min, s.max, s.mean, s.last, s.change_pct
        ));
    }
    if let (Some(first), Some(last)) = (index.first(), index.last()) {
        lines.push(format!(
            "Market_Index: first {:.2} ({}), last {:.2} ({})",
            first.close, first.date, last.close, last.date
        ));
    }
    lines.join("\n")
}

/// Full market-trends operation: feed → index + summaries → model commentary.
pub async fn analyze_market_trends(
    feed: &dyn MarketDataFeed,
    redis: &redis::Client,
    llm: &LlmClient,
) -> Result<MarketTrendsReport, AppError> {
    let series = fetch_sector_series(feed, redis).await?;

    let index = market_index(&series);
    let summaries: Vec<TickerSummary> = series.iter().filter_map(summarize).collect();

    let context = format_market_context(&summaries, &index);
    let prompt = analysis_prompt(MARKET_TRENDS_TASK, &context);
    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Market trend analysis failed: {e}")))?;

    Ok(MarketTrendsReport {
        summaries,
        market_index: index,
        analysis: extraction::passthrough(reply),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_market_context_lists_tickers_and_index() {
        let summaries = vec![TickerSummary {
            symbol: "AMZN".to_string(),
            min: 180.0,
            max: 200.0,
            mean: 190.0,
            last: 195.0,
            change_pct: 4.3,
        }];
        let index = vec![
            DailyClose {
                date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                close: 150.0,
            },
            DailyClose {
                date: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
                close: 160.0,
            },
        ];
        let context = format_market_context(&summaries, &index);
        assert!(context.contains("AMZN: min 180.00, max 200.00, mean 190.00, last 195.00, change +4.30%"));
        assert!(context.contains("Market_Index: first 150.00 (2025-01-02), last 160.00 (2025-01-30)"));
    }

    #[test]
    fn test_format_market_context_without_index() {
        let context = format_market_context(&[], &[]);
        assert!(context.contains("last 30 days"));
        assert!(!context.contains("Market_Index"));
    }
}
