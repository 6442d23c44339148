use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::repository::StoreError;

/// A single report that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("report for tenant '{tenant_id}' facility '{facility_id}' on {date} not written: {reason}")]
pub struct SinkFailure {
    pub tenant_id: String,
    pub facility_id: String,
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("History store unavailable: {0}")]
    SourceUnavailable(#[source] StoreError),

    #[error(
        "{} report write(s) failed ({} written): {}",
        .failures.len(),
        .reports_written,
        describe_failures(.failures)
    )]
    SinkWriteFailed {
        failures: Vec<SinkFailure>,
        reports_written: usize,
    },
}

impl AggregationError {
    /// Caller-facing description without per-record detail.
    pub fn public_message(&self) -> String {
        match self {
            AggregationError::SourceUnavailable(_) => "History store unavailable".to_string(),
            AggregationError::SinkWriteFailed {
                failures,
                reports_written,
            } => format!(
                "{} report write(s) failed ({} written)",
                failures.len(),
                reports_written
            ),
        }
    }
}

fn describe_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}/{}", f.tenant_id, f.facility_id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Aggregation(e) => {
                tracing::error!("Aggregation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.public_message())
            }
            AppError::Validation(msg) => {
                tracing::warn!("Validation error: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
