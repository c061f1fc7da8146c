//! OpenSASE Fulfillment
//!
//! Back-office order fulfillment and returns workflow.
//!
//! ## Features
//! - Order status administration and delivery confirmation
//! - Warehouse allocation with actor/time stamping
//! - Return approval, completion, refund and pickup tracking
//! - Order and return listings with filters and pagination

use serde::Serialize;
use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod query;
pub mod services;
pub mod store;
pub mod telemetry;

use domain::aggregates::{OrderError, ReturnError};
use query::QueryError;
use store::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Client-facing error category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidState,
    Internal,
}

impl FulfillmentError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self { Self::InvalidArgument(msg.into()) }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::DeliveredIsFinal(_) => Self::InvalidState(e.to_string()),
            _ => Self::InvalidArgument(e.to_string()),
        }
    }
}

impl From<ReturnError> for FulfillmentError {
    fn from(e: ReturnError) -> Self {
        match e {
            ReturnError::InvalidTransition { .. } | ReturnError::NotApproved(_) => Self::InvalidState(e.to_string()),
            _ => Self::InvalidArgument(e.to_string()),
        }
    }
}

impl From<QueryError> for FulfillmentError {
    fn from(e: QueryError) -> Self { Self::InvalidArgument(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;
