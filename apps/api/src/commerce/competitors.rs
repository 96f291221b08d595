//! Competitor store — tracked competitor products owned by the application
//! layer (a Postgres table, not per-session memory) plus positioning analysis.

use serde::Deserialize;
use sqlx::PgPool;

use crate::commerce::prompts::{analysis_prompt, COMPETITOR_TASK};
use crate::errors::AppError;
use crate::extraction;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::commerce::CompetitorProductRow;

#[derive(Debug, Deserialize)]
pub struct AddCompetitorRequest {
    pub name: String,
    pub product: String,
    pub price: f64,
    /// Percent, 0 – 100.
    pub market_share: f64,
}

/// Explicit store over the competitor_products table. Handlers own one per
/// request; no state accumulates outside Postgres.
pub struct CompetitorStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitorStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, req: &AddCompetitorRequest) -> Result<CompetitorProductRow, AppError> {
        if req.price < 0.0 {
            return Err(AppError::Validation("price must be non-negative".to_string()));
        }
        if !(0.0..=100.0).contains(&req.market_share) {
            return Err(AppError::Validation(
                "market_share must be between 0 and 100".to_string(),
            ));
        }

        let row: CompetitorProductRow = sqlx::query_as(
            r#"
            INSERT INTO competitor_products (name, product, price, market_share, added_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.product)
        .bind(req.price)
        .bind(req.market_share)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<CompetitorProductRow>, AppError> {
        let rows: Vec<CompetitorProductRow> =
            sqlx::query_as("SELECT * FROM competitor_products ORDER BY added_at")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }
}

/// Renders the tracked rows the model sees.
pub fn format_competitor_context(rows: &[CompetitorProductRow]) -> String {
    let mut lines = vec!["Competitor data:".to_string()];
    for row in rows {
        lines.push(format!(
            "{} — {}: price {:.2}, market share {:.1}% (added {})",
            row.name,
            row.product,
            row.price,
            row.market_share,
            row.added_at.date_naive()
        ));
    }
    lines.join("\n")
}

/// Positioning analysis over every tracked competitor product.
/// An empty store is a 404 — there is nothing to analyze.
pub async fn analyze_competitors(
    pool: &PgPool,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let rows = CompetitorStore::new(pool).list().await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(
            "No competitor products tracked yet".to_string(),
        ));
    }

    let context = format_competitor_context(&rows);
    let prompt = analysis_prompt(COMPETITOR_TASK, &context);
    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Competitor analysis failed: {e}")))?;

    Ok(extraction::passthrough(reply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_competitor_context() {
        let rows = vec![CompetitorProductRow {
            id: 1,
            name: "Acme".to_string(),
            product: "Widget Pro".to_string(),
            price: 99.9,
            market_share: 15.0,
            added_at: Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap(),
        }];
        let context = format_competitor_context(&rows);
        assert!(context.starts_with("Competitor data:"));
        assert!(context.contains("Acme — Widget Pro: price 99.90, market share 15.0% (added 2025-08-01)"));
    }
}
