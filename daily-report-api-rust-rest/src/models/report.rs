use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::iso_millis;

/// A session that contributed to a daily average, with timestamps normalized to
/// `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSession {
    #[serde(with = "iso_millis")]
    pub parking_started_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub parking_ended_at: DateTime<Utc>,
}

/// Per-facility usage summary for one calendar day. `id` is the report key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub id: String,
    pub date: NaiveDate,
    pub tenant_id: String,
    pub facility_id: String,
    pub total_cars_in_facility: u64,
    pub average_parking_duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ReportedSession>>,
}
