use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::service::DailyAggregationService;

pub fn router() -> Router<DailyAggregationService> {
    Router::new().route("/daily-report", get(generate_daily_report))
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyReportQuery {
    /// Explicit day to aggregate (`YYYY-MM-DD`); defaults to yesterday.
    pub date: Option<String>,
}

async fn generate_daily_report(
    State(service): State<DailyAggregationService>,
    Query(query): Query<DailyReportQuery>,
) -> Result<String, AppError> {
    let summary = match query.date.as_deref() {
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
            })?;
            tracing::info!("{} Received on-demand daily report request for {}", API_NAME, day);
            service.run_for_day(day).await?
        }
        None => {
            tracing::info!("{} Received scheduled daily report request", API_NAME);
            service.run(Utc::now()).await?
        }
    };

    Ok(format!(
        "Daily report generated for {} facilities on {}",
        summary.reports_written, summary.target_day
    ))
}
