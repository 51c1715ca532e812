use axum::{extract::State, Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Product, RecommendationQuery, RecommendationResponse},
    services::EngineStats,
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub stats: EngineStats,
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Recommend products for a product, a customer, or overall
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(query): Json<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        product_id = query.product(),
        customer_id = query.customer(),
        top_k = query.top_k,
        "Processing recommendation request"
    );

    let engine = state.engine().await;
    let response = engine.recommend(&query)?;

    tracing::info!(
        request_id = %request_id,
        source = ?response.source,
        count = response.recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(response))
}

/// List the catalog, ordered by product id
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let engine = state.engine().await;
    let products = engine.catalog().products().into_iter().cloned().collect();
    Json(products)
}

/// Rebuild the engine from the data source
pub async fn reload(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    tracing::info!(request_id = %request_id, "Reloading engine snapshot");

    let stats = state.reload().await?;

    Ok(Json(ReloadResponse {
        status: "reloaded",
        stats,
    }))
}
