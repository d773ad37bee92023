//! qdash-api library - production quality dashboard service
//!
//! Read-only reporting over the production database: every request rebuilds its
//! widget payload from the source tables.

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod report;
pub mod source;

use api::report_route;
use qdash_common::ResultCode;
use report::{ReportEngine, ReportShape};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Report pipeline over the shared read-only row source
    pub engine: ReportEngine,
    /// Static dashboard assets served for every unmatched path
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: ReportEngine) -> Self {
        Self {
            engine,
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Dashboard widgets
        .route("/api/statistic", report_route(ReportShape::Summary))
        .route("/api/barOK", report_route(ReportShape::Daily(ResultCode::Ok)))
        .route("/api/barNG", report_route(ReportShape::Daily(ResultCode::Ng)))
        .route("/api/barShiftOK", report_route(ReportShape::Shift(ResultCode::Ok)))
        .route("/api/barShiftNG", report_route(ReportShape::Shift(ResultCode::Ng)))
        .route("/api/pieALL", report_route(ReportShape::DefectsAll))
        .route("/api/pieWEEK", report_route(ReportShape::DefectsWeek))
        .route("/api/line", report_route(ReportShape::TopDefects))
        // Source catalog
        .route("/api/car-types", get(api::get_car_types))
        .route("/api/tables", get(api::get_tables))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    if let Some(dir) = &state.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Dashboards are hosted elsewhere and call in from the browser
        .layer(CorsLayer::permissive())
}
