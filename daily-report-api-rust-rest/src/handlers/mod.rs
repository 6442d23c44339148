pub mod daily_report;
pub mod health;
