use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog product used by the pricing analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub category: String,
    pub product: String,
    pub cost: f64,
    pub current_price: f64,
}

impl ProductRow {
    /// Gross margin as a percentage of the selling price.
    pub fn margin_pct(&self) -> f64 {
        if self.current_price <= 0.0 {
            return 0.0;
        }
        (self.current_price - self.cost) / self.current_price * 100.0
    }
}

/// Tracked competitor product. Replaces the original session-held records
/// with rows owned by the application layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompetitorProductRow {
    pub id: i64,
    pub name: String,
    pub product: String,
    pub price: f64,
    pub market_share: f64,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(cost: f64, price: f64) -> ProductRow {
        ProductRow {
            id: 1,
            category: "Electronics".to_string(),
            product: "Electronics Product 1".to_string(),
            cost,
            current_price: price,
        }
    }

    #[test]
    fn test_margin_pct() {
        let p = product(60.0, 100.0);
        assert!((p.margin_pct() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_margin_pct_zero_price_is_zero() {
        let p = product(10.0, 0.0);
        assert_eq!(p.margin_pct(), 0.0);
    }
}
