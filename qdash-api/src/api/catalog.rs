//! Source catalog endpoints: available vehicle types and table layouts

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use super::report::ReportError;
use crate::report::TableSchema;
use crate::AppState;

/// GET /api/car-types response
#[derive(Debug, Serialize)]
pub struct CarTypesResponse {
    pub code: u16,
    pub data: CarTypesData,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarTypesData {
    pub car_types: Vec<String>,
    pub count: usize,
}

/// GET /api/tables response
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub code: u16,
    pub data: Vec<TableSchema>,
    pub error: String,
}

/// GET /api/car-types
///
/// Distinct vehicle types found in any mapped table, sorted alphabetically.
pub async fn get_car_types(
    State(state): State<AppState>,
) -> Result<Json<CarTypesResponse>, ReportError> {
    let car_types = state.engine.car_types().await.map_err(|e| {
        error!("Car type listing failed: {}", e);
        ReportError::Source(e)
    })?;

    Ok(Json(CarTypesResponse {
        code: 200,
        data: CarTypesData {
            count: car_types.len(),
            car_types,
        },
        message: "获取车型列表成功".to_string(),
    }))
}

/// GET /api/tables
///
/// Column layout of every table in the database.
pub async fn get_tables(State(state): State<AppState>) -> Result<Json<TablesResponse>, ReportError> {
    let data = state.engine.table_schemas().await.map_err(|e| {
        error!("Table layout listing failed: {}", e);
        ReportError::Source(e)
    })?;

    Ok(Json(TablesResponse {
        code: 200,
        data,
        error: String::new(),
    }))
}
