//! Pure filter/reduce step of the daily aggregation: history records in, reports out.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::constants::{API_NAME, NO_RELEVANT_ENTRIES};
use crate::models::{DailyReport, ParkingHistoryRecord, ReportedSession};
use crate::time_utils::{format_duration_hms, report_key};

struct Bucket<'a> {
    tenant_id: &'a str,
    facility_id: &'a str,
    sessions: Vec<ReportedSession>,
}

/// Produces one report per (tenant, facility) bucket of `target_tenant` for `day`.
///
/// Several records (one per vehicle) can share a facility; their matching sessions are
/// pooled before counting and averaging. Sessions are bucketed by the UTC calendar date of
/// `parkingEndedAt`. Records of other tenants are filtered like any other and then
/// discarded. A facility of `target_tenant` with no matching session still gets a
/// zero-count report. Output is ordered by report key and does not depend on the order
/// records were scanned in.
pub fn aggregate(
    records: &[ParkingHistoryRecord],
    target_tenant: &str,
    day: NaiveDate,
) -> Vec<DailyReport> {
    let mut buckets: BTreeMap<String, Bucket<'_>> = BTreeMap::new();

    for record in records {
        if record.tenant_id.is_empty() || record.facility_id.is_empty() {
            tracing::warn!(
                "{} Skipping history record {}: missing tenant or facility id",
                API_NAME,
                record.id
            );
            continue;
        }

        let sessions = sessions_ended_on(record, day);

        if record.tenant_id != target_tenant {
            continue;
        }

        buckets
            .entry(report_key(day, &record.tenant_id, &record.facility_id))
            .or_insert_with(|| Bucket {
                tenant_id: &record.tenant_id,
                facility_id: &record.facility_id,
                sessions: Vec::new(),
            })
            .sessions
            .extend(sessions);
    }

    buckets
        .into_iter()
        .map(|(id, bucket)| build_report(id, bucket, day))
        .collect()
}

fn build_report(id: String, bucket: Bucket<'_>, day: NaiveDate) -> DailyReport {
    let mut sessions = bucket.sessions;
    sessions.sort_by_key(|s| (s.parking_started_at, s.parking_ended_at));
    let (total, average) = summarize(&sessions);

    DailyReport {
        id,
        date: day,
        tenant_id: bucket.tenant_id.to_string(),
        facility_id: bucket.facility_id.to_string(),
        total_cars_in_facility: total,
        average_parking_duration: average,
        history: if sessions.is_empty() { None } else { Some(sessions) },
    }
}

fn sessions_ended_on(record: &ParkingHistoryRecord, day: NaiveDate) -> Vec<ReportedSession> {
    let mut sessions = Vec::new();

    for (index, entry) in record.history.iter().enumerate() {
        let (start, end) = match (entry.parking_started_at, entry.parking_ended_at) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                tracing::warn!(
                    "{} Skipping session {} of tenant: {} facility: {}: missing start or end",
                    API_NAME,
                    index,
                    record.tenant_id,
                    record.facility_id
                );
                continue;
            }
        };

        if end < start {
            tracing::warn!(
                "{} Skipping session {} of tenant: {} facility: {}: ended before it started",
                API_NAME,
                index,
                record.tenant_id,
                record.facility_id
            );
            continue;
        }

        if end.date_naive() == day {
            sessions.push(ReportedSession {
                parking_started_at: start,
                parking_ended_at: end,
            });
        }
    }

    sessions
}

// Simple arithmetic mean, no weighting.
fn summarize(sessions: &[ReportedSession]) -> (u64, String) {
    if sessions.is_empty() {
        return (0, NO_RELEVANT_ENTRIES.to_string());
    }

    let total_millis = sessions.iter().fold(0i64, |acc, session| {
        acc.saturating_add((session.parking_ended_at - session.parking_started_at).num_milliseconds())
    });
    let count = sessions.len() as i64;

    (count as u64, format_duration_hms(total_millis / count))
}
