use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::{HistoryStore, StoreError};
use crate::constants::API_NAME;
use crate::models::{ParkingHistoryRecord, SessionEntry};

#[derive(Debug, Clone, FromRow)]
pub struct ParkingHistoryRow {
    pub id: String,
    pub tenant_id: String,
    pub facility_id: String,
    pub history: Json<Value>,
}

#[derive(Clone)]
pub struct ParkingHistoryRepository {
    pool: PgPool,
    table_name: String,
}

impl ParkingHistoryRepository {
    pub fn new(pool: PgPool, table_name: String) -> Self {
        Self { pool, table_name }
    }
}

#[async_trait]
impl HistoryStore for ParkingHistoryRepository {
    async fn fetch_all(&self) -> Result<Vec<ParkingHistoryRecord>, StoreError> {
        // No tenant predicate: the scan is global, filtering happens in the aggregator.
        let query = format!(
            "SELECT id, tenant_id, facility_id, history FROM {} ORDER BY id",
            self.table_name
        );

        let rows = sqlx::query_as::<_, ParkingHistoryRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        tracing::info!(
            "{} Fetched {} parking history records from {}",
            API_NAME,
            rows.len(),
            self.table_name
        );

        Ok(rows.into_iter().filter_map(decode_row).collect())
    }
}

/// Turns a stored row into a record. Rows whose `history` is not an array are
/// dropped; array elements that are not session objects are skipped.
pub fn decode_row(row: ParkingHistoryRow) -> Option<ParkingHistoryRecord> {
    let Json(history) = row.history;
    let Value::Array(items) = history else {
        tracing::warn!(
            "{} Skipping history record {} (tenant: {}, facility: {}): history is not an array",
            API_NAME,
            row.id,
            row.tenant_id,
            row.facility_id
        );
        return None;
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<SessionEntry>(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    "{} Skipping unreadable session {} in history record {}: {}",
                    API_NAME,
                    index,
                    row.id,
                    e
                );
            }
        }
    }

    Some(ParkingHistoryRecord {
        id: row.id,
        tenant_id: row.tenant_id,
        facility_id: row.facility_id,
        history: entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tracing_test::traced_test;

    fn row(history: Value) -> ParkingHistoryRow {
        ParkingHistoryRow {
            id: "vehicle-1".to_string(),
            tenant_id: "t1".to_string(),
            facility_id: "f1".to_string(),
            history: Json(history),
        }
    }

    #[test]
    fn decode_row_keeps_sessions_in_order() {
        let record = decode_row(row(json!([
            {"parkingStartedAt": "2024-10-09T10:00:00Z", "parkingEndedAt": "2024-10-09T12:30:00Z"},
            {"parkingStartedAt": "2024-10-08T08:00:00Z", "parkingEndedAt": "2024-10-08T09:00:00Z"}
        ])))
        .unwrap();

        assert_eq!(record.tenant_id, "t1");
        assert_eq!(record.facility_id, "f1");
        assert_eq!(
            record.history,
            vec![
                SessionEntry::new(
                    Utc.with_ymd_and_hms(2024, 10, 9, 10, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2024, 10, 9, 12, 30, 0).unwrap(),
                ),
                SessionEntry::new(
                    Utc.with_ymd_and_hms(2024, 10, 8, 8, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2024, 10, 8, 9, 0, 0).unwrap(),
                ),
            ]
        );
    }

    #[test]
    fn decode_row_accepts_empty_history() {
        let record = decode_row(row(json!([]))).unwrap();
        assert!(record.history.is_empty());
    }

    #[test]
    #[traced_test]
    fn decode_row_skips_non_object_sessions() {
        let record = decode_row(row(json!([
            "garbage",
            {"parkingStartedAt": "2024-10-09T10:00:00Z", "parkingEndedAt": "2024-10-09T12:30:00Z"}
        ])))
        .unwrap();

        assert_eq!(record.history.len(), 1);
        assert!(logs_contain("Skipping unreadable session 0 in history record vehicle-1"));
    }

    #[test]
    #[traced_test]
    fn decode_row_drops_record_without_history_array() {
        assert!(decode_row(row(json!({"parkingStartedAt": "2024-10-09T10:00:00Z"}))).is_none());
        assert!(logs_contain("history is not an array"));
    }
}
