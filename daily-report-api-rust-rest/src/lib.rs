pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod time_utils;

use axum::Router;
use handlers::{daily_report, health};
use service::DailyAggregationService;
use tower_http::trace::TraceLayer;

/// Application router with the report trigger and health routes.
pub fn app(service: DailyAggregationService) -> Router {
    Router::new()
        .merge(daily_report::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
