use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Parses a stored session timestamp.
///
/// Accepts RFC 3339 strings, `%Y-%m-%dT%H:%M:%S%.fZ` strings and Unix timestamps
/// in milliseconds written as strings.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Some(naive.and_utc());
    }
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

// Unparseable or missing values become None so the entry can be reported as malformed
// instead of failing the whole record.
fn deserialize_timestamp_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TimestampOrMillis {
        String(String),
        Number(i64),
        Other(serde_json::Value),
    }

    let parsed = match Option::<TimestampOrMillis>::deserialize(deserializer)? {
        Some(TimestampOrMillis::String(s)) => parse_timestamp(&s),
        Some(TimestampOrMillis::Number(ms)) => DateTime::<Utc>::from_timestamp_millis(ms),
        Some(TimestampOrMillis::Other(_)) | None => None,
    };
    Ok(parsed)
}

/// One completed parking session embedded in a history record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    #[serde(default, deserialize_with = "deserialize_timestamp_lenient")]
    pub parking_started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp_lenient")]
    pub parking_ended_at: Option<DateTime<Utc>>,
}

impl SessionEntry {
    pub fn new(parking_started_at: DateTime<Utc>, parking_ended_at: DateTime<Utc>) -> Self {
        Self {
            parking_started_at: Some(parking_started_at),
            parking_ended_at: Some(parking_ended_at),
        }
    }
}

/// Append-only session log for one vehicle/facility pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingHistoryRecord {
    pub id: String,
    pub tenant_id: String,
    pub facility_id: String,
    #[serde(default)]
    pub history: Vec<SessionEntry>,
}

impl ParkingHistoryRecord {
    pub fn new(
        id: impl Into<String>,
        tenant_id: impl Into<String>,
        facility_id: impl Into<String>,
        history: Vec<SessionEntry>,
    ) -> Self {
        Self {
            id: id.into(),
            tenant_id: tenant_id.into(),
            facility_id: facility_id.into(),
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn parse_timestamp_accepts_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 9, 10, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2024-10-09T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-10-09T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-10-09T10:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("1728468000000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn session_entry_deserializes_strings_and_millis() {
        let entry: SessionEntry = serde_json::from_value(json!({
            "parkingStartedAt": "2024-10-09T10:00:00Z",
            "parkingEndedAt": 1728477000000i64
        }))
        .unwrap();

        assert_eq!(
            entry,
            SessionEntry::new(
                Utc.with_ymd_and_hms(2024, 10, 9, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 10, 9, 12, 30, 0).unwrap(),
            )
        );
    }

    #[test]
    fn session_entry_with_missing_or_garbage_timestamps_is_kept_as_incomplete() {
        let entry: SessionEntry = serde_json::from_value(json!({
            "parkingStartedAt": "not a date",
        }))
        .unwrap();

        assert_eq!(entry, SessionEntry::default());

        let entry: SessionEntry = serde_json::from_value(json!({
            "parkingStartedAt": "2024-10-09T10:00:00Z",
            "parkingEndedAt": null
        }))
        .unwrap();

        assert!(entry.parking_started_at.is_some());
        assert!(entry.parking_ended_at.is_none());
    }
}
