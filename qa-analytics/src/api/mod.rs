//! HTTP API handlers for qa-analytics

pub mod analytics;
pub mod health;
pub mod reports;

pub use analytics::{donut_chart, releases, sprint_error_comparison, summary};
pub use health::health_routes;
pub use reports::{report_table, sprints};
