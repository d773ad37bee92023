//! HTTP API handlers for qdash-api

pub mod buildinfo;
pub mod catalog;
pub mod health;
pub mod report;

pub use buildinfo::get_build_info;
pub use catalog::{get_car_types, get_tables};
pub use health::health_routes;
pub use report::{get_report, report_route, ReportError};
