//! # QA Report Common Library
//!
//! Shared code for the QA report services including:
//! - Report record model and the legacy developer-tagging adapter
//! - Database initialization, schema migrations and row mapping
//! - Configuration loading and root folder resolution
//! - Calendar-day windows and date formatting

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use db::models::{DeveloperOutcome, DeveloperSlot, DeveloperTagging, Environment, ReportRecord, Timeliness};
pub use error::{Error, Result};
