//! Purchase probability — the model predicts and explains; the percentage is
//! recovered through the extraction layer.

use serde::{Deserialize, Serialize};

use crate::commerce::prompts::{analysis_prompt, PURCHASE_PROBABILITY_TASK};
use crate::errors::AppError;
use crate::extraction::{self, Extraction};
use crate::llm_client::prompts::GRANITE_SYSTEM;
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Inputs the prediction is conditioned on.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseFactors {
    pub price: f64,
    /// 1.0 – 5.0
    pub customer_rating: f64,
    /// 0 – 100, percent of capacity
    pub stock_level: u8,
    pub season: Season,
}

impl PurchaseFactors {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.price <= 0.0 {
            return Err(AppError::Validation("price must be positive".to_string()));
        }
        if !(1.0..=5.0).contains(&self.customer_rating) {
            return Err(AppError::Validation(
                "customer_rating must be between 1 and 5".to_string(),
            ));
        }
        if self.stock_level > 100 {
            return Err(AppError::Validation(
                "stock_level must be between 0 and 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Renders the product details the model sees.
pub fn format_factors_context(factors: &PurchaseFactors) -> String {
    format!(
        "Product Details:\n\
         - Price: ${:.2}\n\
         - Customer Rating: {}/5\n\
         - Stock Level: {}%\n\
         - Season: {}",
        factors.price,
        factors.customer_rating,
        factors.stock_level,
        factors.season.as_str()
    )
}

pub struct ProbabilityPrediction {
    pub probability: Extraction<f64>,
    pub analysis: String,
}

/// Full prediction operation: factors → model reasoning → percentage recovery.
/// The model reply is kept as narrative alongside the extracted value.
pub async fn predict_purchase_probability(
    llm: &LlmClient,
    factors: &PurchaseFactors,
) -> Result<ProbabilityPrediction, AppError> {
    factors.validate()?;

    let context = format_factors_context(factors);
    let prompt = analysis_prompt(PURCHASE_PROBABILITY_TASK, &context);
    let reply = llm
        .generate(&prompt, GRANITE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Purchase prediction failed: {e}")))?;

    let probability = extraction::percentage(&reply);
    Ok(ProbabilityPrediction {
        probability,
        analysis: reply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> PurchaseFactors {
        PurchaseFactors {
            price: 100.0,
            customer_rating: 4.0,
            stock_level: 50,
            season: Season::Winter,
        }
    }

    #[test]
    fn test_factors_context_renders_all_details() {
        let context = format_factors_context(&factors());
        assert!(context.contains("- Price: $100.00"));
        assert!(context.contains("- Customer Rating: 4/5"));
        assert!(context.contains("- Stock Level: 50%"));
        assert!(context.contains("- Season: Winter"));
    }

    #[test]
    fn test_validate_accepts_slider_ranges() {
        assert!(factors().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rating() {
        let mut f = factors();
        f.customer_rating = 5.5;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overstocked() {
        let mut f = factors();
        f.stock_level = 101;
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_free_product() {
        let mut f = factors();
        f.price = 0.0;
        assert!(f.validate().is_err());
    }
}
