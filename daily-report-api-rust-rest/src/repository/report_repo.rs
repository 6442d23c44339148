use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{ReportStore, StoreError};
use crate::models::DailyReport;

#[derive(Clone)]
pub struct DailyReportRepository {
    pool: PgPool,
    table_name: String,
}

impl DailyReportRepository {
    pub fn new(pool: PgPool, table_name: String) -> Self {
        Self { pool, table_name }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<DailyReport>, StoreError> {
        let query = format!("SELECT report FROM {} WHERE id = $1", self.table_name);

        let stored: Option<Json<Value>> = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match stored {
            Some(Json(report)) => Ok(Some(serde_json::from_value(report)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ReportStore for DailyReportRepository {
    async fn upsert(&self, report: &DailyReport) -> Result<(), StoreError> {
        let report_json = serde_json::to_string(report)?;

        // Every column is overwritten on conflict so a re-run replaces rather than merges.
        let query = format!(
            "INSERT INTO {} (id, report_date, tenant_id, facility_id, report, updated_at)
             VALUES ($1, $2, $3, $4, $5::jsonb, $6)
             ON CONFLICT (id) DO UPDATE SET
                 report_date = EXCLUDED.report_date,
                 tenant_id = EXCLUDED.tenant_id,
                 facility_id = EXCLUDED.facility_id,
                 report = EXCLUDED.report,
                 updated_at = EXCLUDED.updated_at",
            self.table_name
        );

        sqlx::query(&query)
            .bind(&report.id)
            .bind(report.date)
            .bind(&report.tenant_id)
            .bind(&report.facility_id)
            .bind(&report_json)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
