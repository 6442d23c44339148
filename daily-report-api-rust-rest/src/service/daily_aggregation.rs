use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::task::{self, JoinError, JoinSet};

use crate::constants::API_NAME;
use crate::error::{AggregationError, SinkFailure};
use crate::models::DailyReport;
use crate::repository::{HistoryStore, ReportStore};
use crate::service::report_builder::aggregate;
use crate::time_utils::target_day;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSummary {
    pub target_day: NaiveDate,
    pub records_scanned: usize,
    pub reports_written: usize,
}

#[derive(Clone)]
pub struct DailyAggregationService {
    history_store: Arc<dyn HistoryStore>,
    report_store: Arc<dyn ReportStore>,
    tenant_id: String,
    max_concurrency: usize,
}

impl DailyAggregationService {
    pub fn new(
        history_store: Arc<dyn HistoryStore>,
        report_store: Arc<dyn ReportStore>,
        tenant_id: impl Into<String>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            history_store,
            report_store,
            tenant_id: tenant_id.into(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Aggregates the UTC calendar day before `reference_instant`.
    pub async fn run(
        &self,
        reference_instant: DateTime<Utc>,
    ) -> Result<AggregationSummary, AggregationError> {
        self.run_for_day(target_day(reference_instant)).await
    }

    /// Aggregates an explicit day. Safe to repeat: every write replaces the report at
    /// its key.
    pub async fn run_for_day(&self, day: NaiveDate) -> Result<AggregationSummary, AggregationError> {
        tracing::info!(
            "{} Starting daily aggregation for tenant {} on {}",
            API_NAME,
            self.tenant_id,
            day
        );

        let records = self
            .history_store
            .fetch_all()
            .await
            .map_err(AggregationError::SourceUnavailable)?;
        let records_scanned = records.len();
        let reports = aggregate(&records, &self.tenant_id, day);

        let mut tasks = JoinSet::new();
        let mut origins: HashMap<task::Id, (String, String)> = HashMap::new();
        let mut tally = RunTally::new(day);

        // One task per report key, so no two tasks ever write the same document.
        for report in reports {
            while tasks.len() >= self.max_concurrency {
                if let Some(joined) = tasks.join_next_with_id().await {
                    tally.absorb(joined, &mut origins);
                }
            }

            let origin = (report.tenant_id.clone(), report.facility_id.clone());
            let report_store = Arc::clone(&self.report_store);
            let handle =
                tasks.spawn(async move { write_report(report, day, report_store.as_ref()).await });
            origins.insert(handle.id(), origin);
        }

        // Join barrier: nothing is reported until every dispatched write has finished.
        while let Some(joined) = tasks.join_next_with_id().await {
            tally.absorb(joined, &mut origins);
        }

        let RunTally {
            reports_written,
            failures,
            ..
        } = tally;

        if !failures.is_empty() {
            return Err(AggregationError::SinkWriteFailed {
                failures,
                reports_written,
            });
        }

        tracing::info!(
            "{} Daily aggregation finished for tenant {} on {}: {} records scanned, {} reports written",
            API_NAME,
            self.tenant_id,
            day,
            records_scanned,
            reports_written
        );

        Ok(AggregationSummary {
            target_day: day,
            records_scanned,
            reports_written,
        })
    }
}

async fn write_report(
    report: DailyReport,
    day: NaiveDate,
    report_store: &dyn ReportStore,
) -> Result<(), SinkFailure> {
    report_store.upsert(&report).await.map_err(|e| SinkFailure {
        tenant_id: report.tenant_id.clone(),
        facility_id: report.facility_id.clone(),
        date: day,
        reason: e.to_string(),
    })?;

    tracing::debug!(
        "{} Wrote daily report {} ({} cars, average {})",
        API_NAME,
        report.id,
        report.total_cars_in_facility,
        report.average_parking_duration
    );
    Ok(())
}

struct RunTally {
    day: NaiveDate,
    reports_written: usize,
    failures: Vec<SinkFailure>,
}

impl RunTally {
    fn new(day: NaiveDate) -> Self {
        Self {
            day,
            reports_written: 0,
            failures: Vec::new(),
        }
    }

    fn absorb(
        &mut self,
        joined: Result<(task::Id, Result<(), SinkFailure>), JoinError>,
        origins: &mut HashMap<task::Id, (String, String)>,
    ) {
        match joined {
            Ok((id, outcome)) => {
                origins.remove(&id);
                match outcome {
                    Ok(()) => self.reports_written += 1,
                    Err(failure) => {
                        tracing::error!("{} {}", API_NAME, failure);
                        self.failures.push(failure);
                    }
                }
            }
            Err(join_error) => {
                let (tenant_id, facility_id) = origins
                    .remove(&join_error.id())
                    .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()));
                let failure = SinkFailure {
                    tenant_id,
                    facility_id,
                    date: self.day,
                    reason: format!("aggregation task failed: {}", join_error),
                };
                tracing::error!("{} {}", API_NAME, failure);
                self.failures.push(failure);
            }
        }
    }
}
