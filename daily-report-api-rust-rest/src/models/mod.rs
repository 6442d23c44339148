pub mod history;
pub mod report;

pub use history::{ParkingHistoryRecord, SessionEntry};
pub use report::{DailyReport, ReportedSession};
