//! Comprehensive report — market, pricing, and competitor sections composed
//! into one dated document.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::commerce::competitors::{format_competitor_context, CompetitorStore};
use crate::commerce::market::{fetch_sector_series, format_market_context};
use crate::commerce::pricing::{fetch_pricing_entries, format_pricing_context};
use crate::commerce::prompts::{
    analysis_prompt, REPORT_COMPETITOR_TASK, REPORT_MARKET_TASK, REPORT_PRICING_TASK,
};
use crate::errors::AppError;
use crate::extraction;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;
use crate::market_data::{market_index, summarize, MarketDataFeed};

/// Shown in place of the competitor section when the store is empty.
const NO_COMPETITOR_DATA: &str = "No competitor data available for analysis.";

#[derive(Debug, Serialize)]
pub struct ComprehensiveReport {
    pub generated_on: NaiveDate,
    pub market_analysis: String,
    pub pricing_analysis: String,
    pub competitor_analysis: String,
}

/// Builds the full report. Each section gets its own model call; an empty
/// competitor store degrades that section to a fixed notice instead of
/// failing the report.
pub async fn generate_report(
    pool: &PgPool,
    redis: &redis::Client,
    feed: &dyn MarketDataFeed,
    llm: &LlmClient,
) -> Result<ComprehensiveReport, AppError> {
    let series = fetch_sector_series(feed, redis).await?;
    let index = market_index(&series);
    let summaries: Vec<_> = series.iter().filter_map(summarize).collect();
    let market_context = format_market_context(&summaries, &index);
    let market_analysis = llm
        .generate(
            &analysis_prompt(REPORT_MARKET_TASK, &market_context),
            GRANITE_SYSTEM,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Report market section failed: {e}")))?;

    let pricing_entries = fetch_pricing_entries(pool, redis, None).await?;
    let pricing_context = format_pricing_context(&pricing_entries);
    let pricing_analysis = llm
        .generate(
            &analysis_prompt(REPORT_PRICING_TASK, &pricing_context),
            GRANITE_SYSTEM,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Report pricing section failed: {e}")))?;

    let competitors = CompetitorStore::new(pool).list().await?;
    let competitor_analysis = if competitors.is_empty() {
        NO_COMPETITOR_DATA.to_string()
    } else {
        let competitor_context = format_competitor_context(&competitors);
        llm.generate(
            &analysis_prompt(REPORT_COMPETITOR_TASK, &competitor_context),
            GRANITE_SYSTEM,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Report competitor section failed: {e}")))?
    };

    Ok(ComprehensiveReport {
        generated_on: Utc::now().date_naive(),
        market_analysis: extraction::passthrough(market_analysis),
        pricing_analysis: extraction::passthrough(pricing_analysis),
        competitor_analysis: extraction::passthrough(competitor_analysis),
    })
}
