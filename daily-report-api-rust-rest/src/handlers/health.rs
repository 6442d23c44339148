use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;

use crate::service::DailyAggregationService;

pub fn router() -> Router<DailyAggregationService> {
    Router::new().route("/health", get(health_check))
}

// Liveness only; store health shows up as a failing /daily-report run.
async fn health_check(State(service): State<DailyAggregationService>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "tenantId": service.tenant_id(),
    }))
}
