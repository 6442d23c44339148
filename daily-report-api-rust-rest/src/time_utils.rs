use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::constants::REPORT_KEY_SEPARATOR;

/// The day reported on for a run started at `reference_instant`: its UTC calendar
/// date minus one day.
pub fn target_day(reference_instant: DateTime<Utc>) -> NaiveDate {
    let today = reference_instant.date_naive();
    today.pred_opt().unwrap_or(today)
}

/// Deterministic report key for a (day, tenant, facility) bucket.
pub fn report_key(day: NaiveDate, tenant_id: &str, facility_id: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        day.format("%Y-%m-%d"),
        tenant_id,
        facility_id,
        sep = REPORT_KEY_SEPARATOR
    )
}

/// Formats milliseconds as `hh:mm:ss`. Hours are not wrapped at 24 and the
/// sub-second remainder is dropped.
pub fn format_duration_hms(millis: i64) -> String {
    let total_seconds = millis.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter writing timestamps as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_iso_millis(dt))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("Invalid date format: {}: {}", raw, e)))
    }
}
