//! Domain events
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::aggregates::{OrderStatus, RefundStatus, ReturnStatus};
use crate::domain::value_objects::{OrderId, ReturnId, StaffId, WarehouseId};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum DomainEvent {
    Order(OrderEvent),
    Return(ReturnEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: OrderId, at: DateTime<Utc> },
    StatusChanged { order_id: OrderId, from: OrderStatus, to: OrderStatus, at: DateTime<Utc> },
    Delivered { order_id: OrderId, at: DateTime<Utc>, redelivered: bool },
    WarehouseAllocated { order_id: OrderId, warehouse_id: WarehouseId, previous: Option<WarehouseId>, by: StaffId, at: DateTime<Utc> },
    Deleted { order_id: OrderId, orphaned_returns: u64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReturnEvent {
    Opened { return_id: ReturnId, order_id: OrderId, at: DateTime<Utc> },
    Decided { return_id: ReturnId, status: ReturnStatus, processed_at: DateTime<Utc> },
    Completed { return_id: ReturnId, at: DateTime<Utc> },
    RefundStatusChanged { return_id: ReturnId, from: RefundStatus, to: RefundStatus, at: DateTime<Utc> },
    PickupUpdated { return_id: ReturnId, at: DateTime<Utc> },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Placed { .. }) => "fulfillment.order.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "fulfillment.order.status_changed",
            Self::Order(OrderEvent::Delivered { .. }) => "fulfillment.order.delivered",
            Self::Order(OrderEvent::WarehouseAllocated { .. }) => "fulfillment.order.allocated",
            Self::Order(OrderEvent::Deleted { .. }) => "fulfillment.order.deleted",
            Self::Return(ReturnEvent::Opened { .. }) => "fulfillment.return.opened",
            Self::Return(ReturnEvent::Decided { .. }) => "fulfillment.return.decided",
            Self::Return(ReturnEvent::Completed { .. }) => "fulfillment.return.completed",
            Self::Return(ReturnEvent::RefundStatusChanged { .. }) => "fulfillment.return.refund_changed",
            Self::Return(ReturnEvent::PickupUpdated { .. }) => "fulfillment.return.pickup_updated",
        }
    }

    /// Id of the record the event belongs to.
    pub fn subject_id(&self) -> &str {
        match self {
            Self::Order(OrderEvent::Placed { order_id, .. })
            | Self::Order(OrderEvent::StatusChanged { order_id, .. })
            | Self::Order(OrderEvent::Delivered { order_id, .. })
            | Self::Order(OrderEvent::WarehouseAllocated { order_id, .. })
            | Self::Order(OrderEvent::Deleted { order_id, .. }) => order_id.as_str(),
            Self::Return(ReturnEvent::Opened { return_id, .. })
            | Self::Return(ReturnEvent::Decided { return_id, .. })
            | Self::Return(ReturnEvent::Completed { return_id, .. })
            | Self::Return(ReturnEvent::RefundStatusChanged { return_id, .. })
            | Self::Return(ReturnEvent::PickupUpdated { return_id, .. }) => return_id.as_str(),
        }
    }
}
