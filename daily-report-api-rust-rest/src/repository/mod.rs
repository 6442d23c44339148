pub mod errors;
pub mod history_repo;
pub mod report_repo;

pub use errors::StoreError;
pub use history_repo::ParkingHistoryRepository;
pub use report_repo::DailyReportRepository;

use crate::models::{DailyReport, ParkingHistoryRecord};
use async_trait::async_trait;

/// Read side: a full scan of every history record, across all tenants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<ParkingHistoryRecord>, StoreError>;
}

/// Write side: create-or-replace a report at `report.id`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn upsert(&self, report: &DailyReport) -> Result<(), StoreError>;
}
