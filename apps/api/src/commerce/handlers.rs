//! Axum route handlers for the E-commerce Analytics API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::commerce::competitors::{analyze_competitors, AddCompetitorRequest, CompetitorStore};
use crate::commerce::market::{analyze_market_trends, MarketTrendsReport};
use crate::commerce::pricing::{optimize_pricing, PricingReport};
use crate::commerce::probability::{predict_purchase_probability, PurchaseFactors};
use crate::commerce::report::{generate_report, ComprehensiveReport};
use crate::commerce::segments::{analyze_customer_segments, SegmentReport};
use crate::errors::AppError;
use crate::extraction::FallbackReason;
use crate::models::commerce::CompetitorProductRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProbabilityResponse {
    /// Always usable, in [0, 1]; 0.5 when the reply was unusable.
    pub probability: f64,
    /// False when the default was substituted.
    pub extracted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct CompetitorAnalysisResponse {
    pub analysis: String,
}

/// GET /api/v1/commerce/market-trends
pub async fn handle_market_trends(
    State(state): State<AppState>,
) -> Result<Json<MarketTrendsReport>, AppError> {
    let report = analyze_market_trends(state.market.as_ref(), &state.redis, &state.llm).await?;
    Ok(Json(report))
}

/// GET /api/v1/commerce/pricing/:category
pub async fn handle_pricing(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<PricingReport>, AppError> {
    let report = optimize_pricing(&state.db, &state.redis, &state.llm, &category).await?;
    Ok(Json(report))
}

/// POST /api/v1/commerce/purchase-probability
pub async fn handle_purchase_probability(
    State(state): State<AppState>,
    Json(factors): Json<PurchaseFactors>,
) -> Result<Json<ProbabilityResponse>, AppError> {
    let prediction = predict_purchase_probability(&state.llm, &factors).await?;

    Ok(Json(ProbabilityResponse {
        probability: prediction.probability.value,
        extracted: prediction.probability.ok,
        fallback_reason: prediction.probability.reason,
        analysis: prediction.analysis,
    }))
}

/// POST /api/v1/commerce/competitors
pub async fn handle_add_competitor(
    State(state): State<AppState>,
    Json(req): Json<AddCompetitorRequest>,
) -> Result<(StatusCode, Json<CompetitorProductRow>), AppError> {
    let row = CompetitorStore::new(&state.db).add(&req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/commerce/competitors
pub async fn handle_list_competitors(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompetitorProductRow>>, AppError> {
    let rows = CompetitorStore::new(&state.db).list().await?;
    Ok(Json(rows))
}

/// GET /api/v1/commerce/competitors/analysis
pub async fn handle_competitor_analysis(
    State(state): State<AppState>,
) -> Result<Json<CompetitorAnalysisResponse>, AppError> {
    let analysis = analyze_competitors(&state.db, &state.llm).await?;
    Ok(Json(CompetitorAnalysisResponse { analysis }))
}

/// GET /api/v1/commerce/segments
pub async fn handle_segments(
    State(state): State<AppState>,
) -> Result<Json<SegmentReport>, AppError> {
    let report = analyze_customer_segments(&state.llm).await?;
    Ok(Json(report))
}

/// GET /api/v1/commerce/report
pub async fn handle_report(
    State(state): State<AppState>,
) -> Result<Json<ComprehensiveReport>, AppError> {
    let report = generate_report(&state.db, &state.redis, state.market.as_ref(), &state.llm).await?;
    Ok(Json(report))
}
