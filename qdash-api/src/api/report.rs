//! Dashboard widget endpoints
//!
//! All widget routes share one handler parameterized by `ReportShape`. Query
//! parameters:
//! - `carType`: vehicle type code, `ALL` (default) for no filter
//! - `any`: `1` restricts the report to records dated today

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Json,
};
use qdash_common::time::local_today;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::report::{ReportOutput, ReportQuery, ReportShape};
use crate::AppState;

/// Query parameters accepted by every widget route
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    #[serde(rename = "carType")]
    pub car_type: Option<String>,
    pub any: Option<String>,
}

impl ReportParams {
    /// Today-only mode is enabled by `any=1` only
    pub fn today_only(&self) -> bool {
        self.any.as_deref() == Some("1")
    }
}

/// GET handler for one widget route
pub fn report_route(shape: ReportShape) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Query(params): Query<ReportParams>| async move {
            get_report(shape, state, params).await
        },
    )
}

/// Run the report pipeline for `shape` against today's local date
pub async fn get_report(
    shape: ReportShape,
    state: AppState,
    params: ReportParams,
) -> Result<Json<ReportOutput>, ReportError> {
    let car_type = state.engine.normalize_car_type(params.car_type.as_deref());
    let query = ReportQuery::new(car_type, params.today_only());

    let output = state
        .engine
        .run(shape, &query, local_today())
        .await
        .map_err(|e| {
            error!(?shape, car_type = query.car_type.as_str(), "Report query failed: {}", e);
            ReportError::Source(e)
        })?;

    Ok(Json(output))
}

/// Report API errors
///
/// Upstream failures are reported to the caller generically; the cause is logged.
#[derive(Debug)]
pub enum ReportError {
    Source(qdash_common::Error),
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ReportError::Source(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to query production data".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
