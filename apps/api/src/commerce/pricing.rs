//! Pricing optimization — catalog margins plus model recommendations.

use serde::Serialize;
use sqlx::PgPool;

use crate::cache;
use crate::commerce::prompts::{analysis_prompt, PRICING_TASK_TEMPLATE};
use crate::errors::AppError;
use crate::extraction;
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::commerce::ProductRow;

/// A catalog row with its derived margin, as exposed to clients and the model.
#[derive(Debug, Clone, Serialize)]
pub struct PricingEntry {
    pub category: String,
    pub product: String,
    pub cost: f64,
    pub current_price: f64,
    pub margin_pct: f64,
}

impl From<ProductRow> for PricingEntry {
    fn from(row: ProductRow) -> Self {
        let margin_pct = row.margin_pct();
        Self {
            category: row.category,
            product: row.product,
            cost: row.cost,
            current_price: row.current_price,
            margin_pct,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PricingReport {
    pub category: String,
    pub entries: Vec<PricingEntry>,
    pub recommendations: String,
}

/// Loads catalog products, optionally filtered by category, consulting the
/// Redis snapshot first.
pub async fn fetch_pricing_entries(
    pool: &PgPool,
    redis: &redis::Client,
    category: Option<&str>,
) -> Result<Vec<PricingEntry>, AppError> {
    let cache_key = match category {
        Some(c) => format!("pricing:{c}"),
        None => "pricing:all".to_string(),
    };
    if let Some(rows) = cache::get_json::<Vec<ProductRow>>(redis, &cache_key).await {
        return Ok(rows.into_iter().map(PricingEntry::from).collect());
    }

    let rows: Vec<ProductRow> = sqlx::query_as(
        r#"
        SELECT * FROM products
        WHERE ($1::TEXT IS NULL OR category = $1)
        ORDER BY category, product
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await?;

    cache::put_json(redis, &cache_key, &rows, cache::PRICING_TTL_SECS).await;
    Ok(rows.into_iter().map(PricingEntry::from).collect())
}

/// Renders the pricing rows the model sees.
pub fn format_pricing_context(entries: &[PricingEntry]) -> String {
    let mut lines = vec!["Current pricing data:".to_string()];
    for e in entries {
        lines.push(format!(
            "{} / {}: cost {:.2}, price {:.2}, margin {:.1}%",
            e.category, e.product, e.cost, e.current_price, e.margin_pct
        ));
    }
    lines.join("\n")
}

/// Full pricing operation for one category: catalog → margins → model
/// recommendations. Unknown categories are 404s.
pub async fn optimize_pricing(
    pool: &PgPool,
    redis: &redis::Client,
    llm: &LlmClient,
    category: &str,
) -> Result<PricingReport, AppError> {
    let entries = fetch_pricing_entries(pool, redis, Some(category)).await?;
    if entries.is_empty() {
        return Err(AppError::NotFound(format!(
            "No products found in category '{category}'"
        )));
    }

    let context = format_pricing_context(&entries);
    let task = PRICING_TASK_TEMPLATE.replace("{category}", category);
    let prompt = analysis_prompt(&task, &context);
    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Pricing analysis failed: {e}")))?;

    Ok(PricingReport {
        category: category.to_string(),
        entries,
        recommendations: extraction::passthrough(reply),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_entry_derives_margin() {
        let entry = PricingEntry::from(ProductRow {
            id: 7,
            category: "Beauty".to_string(),
            product: "Beauty Product 2".to_string(),
            cost: 30.0,
            current_price: 50.0,
        });
        assert!((entry.margin_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_pricing_context() {
        let entries = vec![PricingEntry {
            category: "Electronics".to_string(),
            product: "Electronics Product 1".to_string(),
            cost: 400.0,
            current_price: 500.0,
            margin_pct: 20.0,
        }];
        let context = format_pricing_context(&entries);
        assert!(context.starts_with("Current pricing data:"));
        assert!(context
            .contains("Electronics / Electronics Product 1: cost 400.00, price 500.00, margin 20.0%"));
    }
}
