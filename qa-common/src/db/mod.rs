//! Database models and queries

pub mod init;
pub mod migrations;
pub mod models;
pub mod reports;

pub use init::init_database;
pub use models::*;
pub use reports::{count_reports, save_report, RecordDecodeError, ReportRow, REPORT_COLUMNS};
