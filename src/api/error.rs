//! Error responses: `{"kind": ..., "message": ...}` with a matching status code.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::ValidationErrors;

use crate::{ErrorKind, FulfillmentError};

#[derive(Debug)]
pub struct ApiError(pub FulfillmentError);

impl<E> From<E> for ApiError
where
    E: Into<FulfillmentError>,
{
    fn from(e: E) -> Self { Self(e.into()) }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self { Self(FulfillmentError::InvalidArgument(msg.into())) }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidState => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = match kind {
            ErrorKind::Internal => {
                tracing::error!(error = %self.0, "request failed");
                "internal server error".to_string()
            }
            _ => self.0.to_string(),
        };
        (status_for(kind), Json(json!({ "kind": kind, "message": message }))).into_response()
    }
}

pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(b)| b).map_err(|e| ApiError::bad_request(e.body_text()))
}

pub fn query_params<T>(query: Result<axum::extract::Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|axum::extract::Query(q)| q).map_err(|e| ApiError::bad_request(e.body_text()))
}

pub fn validated<T: validator::Validate>(value: T) -> Result<T, ApiError> {
    value.validate().map_err(|e: ValidationErrors| ApiError::bad_request(e.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::InvalidState), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_errors_are_opaque() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "internal");
        assert_eq!(body["message"], "internal server error");
    }
}
