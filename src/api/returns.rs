//! Return endpoints.

use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{OpenReturnRequest, PickupRequest, RefundStatusRequest, ReturnDetailsView, ReturnListQuery, ReturnView, UpdateReturnStatusRequest};
use super::error::{json_body, query_params, validated, ApiError};
use super::AppState;
use crate::domain::aggregates::{PickupUpdate, RefundStatus, ReturnDecision};
use crate::domain::value_objects::ReturnId;
use crate::query::{Page, ReturnFilter};

pub async fn list_returns(State(s): State<AppState>, query: Result<Query<ReturnListQuery>, QueryRejection>) -> Result<Json<Page<ReturnDetailsView>>, ApiError> {
    let filter = ReturnFilter::try_from(validated(query_params(query)?)?)?;
    let page = s.services.returns.list_returns(&filter).await?;
    Ok(Json(page.map(ReturnDetailsView::from)))
}

pub async fn open_return(State(s): State<AppState>, body: Result<Json<OpenReturnRequest>, JsonRejection>) -> Result<(StatusCode, Json<ReturnDetailsView>), ApiError> {
    let req = validated(json_body(body)?)?;
    let details = s.services.returns.open_return(req.into()).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

pub async fn get_return(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ReturnDetailsView>, ApiError> {
    let details = s.services.returns.get_return(&ReturnId::from(id)).await?;
    Ok(Json(details.into()))
}

pub async fn update_status(
    State(s): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateReturnStatusRequest>, JsonRejection>,
) -> Result<Json<ReturnView>, ApiError> {
    let req = json_body(body)?;
    let decision: ReturnDecision = req.status.as_deref().ok_or_else(|| ApiError::bad_request("status is required"))?.parse()?;
    let processed_at = req.processed_at()?;
    let request = s.services.returns.update_status(&ReturnId::from(id), decision, processed_at).await?;
    Ok(Json(ReturnView::from(&request)))
}

pub async fn set_refund_status(
    State(s): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RefundStatusRequest>, JsonRejection>,
) -> Result<Json<ReturnView>, ApiError> {
    let req = json_body(body)?;
    let refund: RefundStatus = req.refund_status.as_deref().ok_or_else(|| ApiError::bad_request("refundStatus is required"))?.parse()?;
    let request = s.services.returns.set_refund_status(&ReturnId::from(id), refund).await?;
    Ok(Json(ReturnView::from(&request)))
}

pub async fn mark_complete(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ReturnView>, ApiError> {
    let request = s.services.returns.mark_complete(&ReturnId::from(id)).await?;
    Ok(Json(ReturnView::from(&request)))
}

pub async fn update_pickup(
    State(s): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PickupRequest>, JsonRejection>,
) -> Result<Json<ReturnView>, ApiError> {
    let update = PickupUpdate::try_from(validated(json_body(body)?)?)?;
    let request = s.services.returns.update_pickup(&ReturnId::from(id), update).await?;
    Ok(Json(ReturnView::from(&request)))
}
