pub const API_NAME: &str = "[daily-report-api-rust-rest]";

/// Average-duration value stored when no session ended on the reported day.
pub const NO_RELEVANT_ENTRIES: &str = "no relevant entries";

/// Joins date, tenant and facility into a report key. Ids containing it are unsupported.
pub const REPORT_KEY_SEPARATOR: char = ':';
