//! Return Aggregate
//!
//! A return is a child workflow of one delivered order line. It carries three
//! independent sub-states: the decision status, the refund status and pickup progress.
//! Only the decision status has a transition table:
//!
//! ```text
//! pending --approve--> approved --complete--> completed
//! pending --reject---> rejected
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::domain::events::{DomainEvent, ReturnEvent};
use crate::domain::value_objects::{OrderId, ProductId, ReturnId, VariantId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    id: ReturnId,
    order_id: OrderId,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    quantity: u32,
    reason: String,
    status: ReturnStatus,
    processed_at: Option<DateTime<Utc>>,
    refund_status: RefundStatus,
    refunded_at: Option<DateTime<Utc>>,
    pickup: Pickup,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus { #[default] Pending, Approved, Rejected, Completed }

/// The only statuses a reviewer may set directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnDecision { Approved, Rejected }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus { #[default] Pending, Refunded, NotApplicable }

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub scheduled: bool,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

/// Partial pickup change. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PickupUpdate {
    pub scheduled: Option<bool>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

impl PickupUpdate {
    pub fn is_empty(&self) -> bool { self.scheduled.is_none() && self.date.is_none() && self.status.is_none() }
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Rejected | Self::Completed) }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ReturnStatus {
    type Err = ReturnError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            _ => Err(ReturnError::UnknownStatus(s.to_string())),
        }
    }
}

impl From<ReturnDecision> for ReturnStatus {
    fn from(d: ReturnDecision) -> Self {
        match d { ReturnDecision::Approved => Self::Approved, ReturnDecision::Rejected => Self::Rejected }
    }
}

impl FromStr for ReturnDecision {
    type Err = ReturnError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ReturnError::InvalidDecision(s.to_string())),
        }
    }
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::Refunded => "refunded", Self::NotApplicable => "not_applicable" }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RefundStatus {
    type Err = ReturnError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "refunded" => Ok(Self::Refunded),
            "not_applicable" => Ok(Self::NotApplicable),
            _ => Err(ReturnError::UnknownRefundStatus(s.to_string())),
        }
    }
}

/// Request to return part of one order line.
#[derive(Clone, Debug)]
pub struct NewReturn {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub reason: String,
}

impl ReturnRequest {
    /// Opens a pending return. Eligibility against the order is checked by the caller.
    pub fn open(id: ReturnId, new: NewReturn, now: DateTime<Utc>) -> Result<Self, ReturnError> {
        if new.quantity == 0 { return Err(ReturnError::InvalidQuantity); }
        let reason = new.reason.trim().to_string();
        if reason.is_empty() { return Err(ReturnError::MissingReason); }
        let mut request = Self {
            id: id.clone(), order_id: new.order_id.clone(), product_id: new.product_id, variant_id: new.variant_id,
            quantity: new.quantity, reason, status: ReturnStatus::Pending, processed_at: None,
            refund_status: RefundStatus::Pending, refunded_at: None, pickup: Pickup::default(),
            created_at: now, updated_at: now, events: vec![],
        };
        request.raise_event(ReturnEvent::Opened { return_id: id, order_id: new.order_id, at: now });
        Ok(request)
    }

    pub fn id(&self) -> &ReturnId { &self.id }
    pub fn order_id(&self) -> &OrderId { &self.order_id }
    pub fn product_id(&self) -> &ProductId { &self.product_id }
    pub fn variant_id(&self) -> Option<&VariantId> { self.variant_id.as_ref() }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn reason(&self) -> &str { &self.reason }
    pub fn status(&self) -> ReturnStatus { self.status }
    pub fn processed_at(&self) -> Option<DateTime<Utc>> { self.processed_at }
    pub fn refund_status(&self) -> RefundStatus { self.refund_status }
    pub fn refunded_at(&self) -> Option<DateTime<Utc>> { self.refunded_at }
    pub fn pickup(&self) -> &Pickup { &self.pickup }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Approve or reject a pending return, stamping `processed_at`.
    ///
    /// Repeating the decision the return already carries is a no-op and returns `false`.
    pub fn decide(&mut self, decision: ReturnDecision, processed_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<bool, ReturnError> {
        let to = ReturnStatus::from(decision);
        match self.status {
            ReturnStatus::Pending => {}
            current if current == to => return Ok(false),
            current => return Err(ReturnError::InvalidTransition { from: current, to }),
        }
        self.status = to;
        self.processed_at = Some(processed_at);
        self.touch(now);
        self.raise_event(ReturnEvent::Decided { return_id: self.id.clone(), status: to, processed_at });
        Ok(true)
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ReturnError> {
        if self.status != ReturnStatus::Approved { return Err(ReturnError::NotApproved(self.status)); }
        self.status = ReturnStatus::Completed;
        self.touch(now);
        self.raise_event(ReturnEvent::Completed { return_id: self.id.clone(), at: now });
        Ok(())
    }

    /// Independent of the decision status. `refunded_at` is stamped on entering
    /// `refunded` and cleared on leaving it.
    pub fn set_refund_status(&mut self, to: RefundStatus, now: DateTime<Utc>) {
        let from = self.refund_status;
        if from == to { return; }
        self.refund_status = to;
        self.refunded_at = (to == RefundStatus::Refunded).then_some(now);
        self.touch(now);
        self.raise_event(ReturnEvent::RefundStatusChanged { return_id: self.id.clone(), from, to, at: now });
    }

    pub fn update_pickup(&mut self, update: PickupUpdate, now: DateTime<Utc>) {
        if update.is_empty() { return; }
        if let Some(scheduled) = update.scheduled { self.pickup.scheduled = scheduled; }
        if let Some(date) = update.date { self.pickup.date = Some(date); }
        if let Some(status) = update.status { self.pickup.status = Some(status); }
        self.touch(now);
        self.raise_event(ReturnEvent::PickupUpdated { return_id: self.id.clone(), at: now });
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: ReturnEvent) { self.events.push(DomainEvent::Return(e)); }
    fn touch(&mut self, now: DateTime<Utc>) { self.updated_at = now; }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReturnError {
    #[error("return quantity must be at least 1")]
    InvalidQuantity,
    #[error("return reason is required")]
    MissingReason,
    #[error("unknown return status '{0}'")]
    UnknownStatus(String),
    #[error("status must be 'approved' or 'rejected', got '{0}'")]
    InvalidDecision(String),
    #[error("refund status must be one of pending, refunded, not_applicable, got '{0}'")]
    UnknownRefundStatus(String),
    #[error("return cannot move from {from} to {to}")]
    InvalidTransition { from: ReturnStatus, to: ReturnStatus },
    #[error("only approved returns can be completed (current status: {0})")]
    NotApproved(ReturnStatus),
}
