//! Order endpoints.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{AllocateWarehouseRequest, OrderListQuery, OrderView, PlaceOrderRequest, UpdateOrderStatusRequest};
use super::error::{json_body, query_params, validated, ApiError};
use super::{actor::Actor, AppState};
use crate::domain::value_objects::{OrderId, WarehouseId};
use crate::query::OrderFilter;

pub async fn list_orders(State(s): State<AppState>, query: Result<Query<OrderListQuery>, QueryRejection>) -> Result<Json<Vec<OrderView>>, ApiError> {
    let filter = OrderFilter::try_from(query_params(query)?)?;
    let orders = s.services.orders.list_orders(&filter).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

pub async fn place_order(State(s): State<AppState>, body: Result<Json<PlaceOrderRequest>, JsonRejection>) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    let req = validated(json_body(body)?)?;
    let order = s.services.orders.place_order(req.into()).await?;
    Ok((StatusCode::CREATED, Json(OrderView::from(&order))))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<OrderView>, ApiError> {
    let details = s.services.orders.get_order(&OrderId::from(id)).await?;
    Ok(Json(details.into()))
}

pub async fn update_status(
    State(s): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<OrderView>, ApiError> {
    let status = json_body(body)?.status()?;
    let order = s.services.orders.update_status(&OrderId::from(id), status).await?;
    Ok(Json(OrderView::from(&order)))
}

pub async fn mark_delivered(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<OrderView>, ApiError> {
    let order = s.services.orders.mark_delivered(&OrderId::from(id)).await?;
    Ok(Json(OrderView::from(&order)))
}

pub async fn allocate_warehouse(
    State(s): State<AppState>,
    Path(id): Path<String>,
    Actor(actor): Actor,
    body: Result<Json<AllocateWarehouseRequest>, JsonRejection>,
) -> Result<Json<OrderView>, ApiError> {
    let warehouse_id = json_body(body)?.warehouse_id.map(WarehouseId::from);
    let order = s.services.allocation.allocate(&OrderId::from(id), warehouse_id, actor).await?;
    Ok(Json(OrderView::from(&order)))
}

pub async fn delete_order(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    s.services.orders.delete_order(&OrderId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
