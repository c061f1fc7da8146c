//! Read-only warehouse directory endpoints.

use axum::{extract::{Path, State}, Json};

use super::error::ApiError;
use super::AppState;
use crate::domain::aggregates::Warehouse;
use crate::domain::value_objects::WarehouseId;
use crate::FulfillmentError;

pub async fn list_warehouses(State(s): State<AppState>) -> Result<Json<Vec<Warehouse>>, ApiError> {
    Ok(Json(s.repos.warehouses.list().await?))
}

pub async fn get_warehouse(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Warehouse>, ApiError> {
    let id = WarehouseId::from(id);
    let warehouse = s.repos.warehouses.get(&id).await?.ok_or_else(|| FulfillmentError::not_found("warehouse", &id))?;
    Ok(Json(warehouse))
}
