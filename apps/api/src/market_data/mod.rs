//! Market data feed — daily closing prices per ticker behind a pluggable trait.
//!
//! `AppState` holds an `Arc<dyn MarketDataFeed>`; production uses
//! `YahooChartFeed`, tests swap in a fixture feed. Feed failures are visible
//! errors (502 at the API boundary) — unlike model-reply extraction, there is
//! no silent default for missing price data.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tickers tracked for the e-commerce sector trend view.
pub const SECTOR_TICKERS: &[&str] = &["AMZN", "SHOP", "ETSY", "WMT", "TGT"];

/// Lookback window for trend analysis, in days.
pub const TREND_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed feed payload for {0}")]
    Malformed(String),

    #[error("No closes returned for {0}")]
    Empty(String),
}

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closes for a single ticker, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSeries {
    pub symbol: String,
    pub closes: Vec<DailyClose>,
}

/// The market-data collaborator. Implement this to swap feed providers
/// without touching handlers or analysis code.
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TickerSeries, FeedError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Yahoo chart API implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Vec<Option<f64>>,
}

/// Feed backed by the Yahoo Finance chart endpoint
/// (`/v8/finance/chart/{symbol}?period1&period2&interval=1d`).
pub struct YahooChartFeed {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartFeed {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MarketDataFeed for YahooChartFeed {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<TickerSeries, FeedError> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            symbol,
            start.timestamp(),
            end.timestamp()
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ChartEnvelope = response.json().await?;
        let result = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| FeedError::Malformed(symbol.to_string()))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| FeedError::Empty(symbol.to_string()))?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::Malformed(symbol.to_string()))?;

        // Holidays and halts come through as nulls; drop them.
        let closes: Vec<DailyClose> = timestamps
            .iter()
            .zip(quote.close.iter())
            .filter_map(|(ts, close)| {
                let close = (*close)?;
                let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
                Some(DailyClose { date, close })
            })
            .collect();

        if closes.is_empty() {
            return Err(FeedError::Empty(symbol.to_string()));
        }

        Ok(TickerSeries {
            symbol: symbol.to_string(),
            closes,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Series math
// ────────────────────────────────────────────────────────────────────────────

/// Equal-weight market index: for each trading day, the mean close across
/// the tickers that traded that day.
pub fn market_index(series: &[TickerSeries]) -> Vec<DailyClose> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for ticker in series {
        for point in &ticker.closes {
            by_date.entry(point.date).or_default().push(point.close);
        }
    }
    by_date
        .into_iter()
        .map(|(date, closes)| DailyClose {
            date,
            close: closes.iter().sum::<f64>() / closes.len() as f64,
        })
        .collect()
}

/// Descriptive statistics for one ticker over the window.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSummary {
    pub symbol: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub last: f64,
    /// Percent change from the first to the last close in the window.
    pub change_pct: f64,
}

/// Summarizes a non-empty series. Returns `None` when there are no closes.
pub fn summarize(series: &TickerSeries) -> Option<TickerSummary> {
    let first = series.closes.first()?.close;
    let last = series.closes.last()?.close;
    let n = series.closes.len() as f64;

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for point in &series.closes {
        min = min.min(point.close);
        max = max.max(point.close);
        sum += point.close;
    }

    Some(TickerSummary {
        symbol: series.symbol.clone(),
        min,
        max,
        mean: sum / n,
        last,
        change_pct: if first == 0.0 {
            0.0
        } else {
            (last - first) / first * 100.0
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn series(symbol: &str, points: &[(u32, f64)]) -> TickerSeries {
        TickerSeries {
            symbol: symbol.to_string(),
            closes: points
                .iter()
                .map(|(d, close)| DailyClose {
                    date: day(*d),
                    close: *close,
                })
                .collect(),
        }
    }

    #[test]
    fn test_market_index_is_row_mean() {
        let index = market_index(&[
            series("AMZN", &[(1, 100.0), (2, 110.0)]),
            series("WMT", &[(1, 200.0), (2, 190.0)]),
        ]);
        assert_eq!(index.len(), 2);
        assert!((index[0].close - 150.0).abs() < 1e-9);
        assert!((index[1].close - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_index_averages_available_tickers_per_day() {
        // WMT missing day 2: day 2's index is AMZN alone.
        let index = market_index(&[
            series("AMZN", &[(1, 100.0), (2, 120.0)]),
            series("WMT", &[(1, 200.0)]),
        ]);
        assert_eq!(index.len(), 2);
        assert!((index[1].close - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_stats() {
        let s = summarize(&series("SHOP", &[(1, 50.0), (2, 70.0), (3, 60.0)])).unwrap();
        assert!((s.min - 50.0).abs() < 1e-9);
        assert!((s.max - 70.0).abs() < 1e-9);
        assert!((s.mean - 60.0).abs() < 1e-9);
        assert!((s.last - 60.0).abs() < 1e-9);
        assert!((s.change_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty_series_is_none() {
        assert!(summarize(&series("ETSY", &[])).is_none());
    }

    #[test]
    fn test_chart_envelope_deserializes_with_nulls() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1735689600, 1735776000],
                    "indicators": {"quote": [{"close": [220.5, null]}]}
                }],
                "error": null
            }
        }"#;
        let parsed: ChartEnvelope = serde_json::from_str(json).unwrap();
        let result = &parsed.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.timestamp.as_ref().unwrap().len(), 2);
        assert_eq!(result.indicators.quote[0].close[1], None);
    }
}
