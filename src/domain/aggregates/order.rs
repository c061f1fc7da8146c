//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{AddressError, Money, OrderId, ProductId, ShippingAddress, StaffId, VariantId, WarehouseId};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    order_number: String,
    customer_id: Option<String>,
    items: Vec<LineItem>,
    shipping_address: ShippingAddress,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    delivered_at: Option<DateTime<Utc>>,
    allocation: Option<Allocation>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

/// One ordered line. Title and variant title are snapshots taken at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub title: String,
    #[serde(default)]
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn total(&self) -> Money { self.unit_price.multiply(self.quantity) }
    pub fn is_for(&self, product: &ProductId, variant: Option<&VariantId>) -> bool {
        &self.product_id == product && self.variant_id.as_ref() == variant
    }
}

/// Who bound the order to which warehouse, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub warehouse_id: WarehouseId,
    pub allocated_by: StaffId,
    pub allocated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus { #[default] Pending, Confirmed, Processing, Shipped, Delivered, Cancelled, Returned }

/// Snapshot taken at checkout. Payment is settled by the payment service; nothing here changes it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus { #[default] Pending, Paid, Failed, Refunded }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarehouseAllocationStatus { Unallocated, Allocated }

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Pending, Self::Confirmed, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled, Self::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

impl WarehouseAllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Unallocated => "unallocated", Self::Allocated => "allocated" }
    }
}

/// Checkout payload turned into a new order.
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub order_number: Option<String>,
    pub customer_id: Option<String>,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
}

impl Order {
    pub fn place(id: OrderId, new: NewOrder, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if new.items.is_empty() { return Err(OrderError::NoItems); }
        if new.items.iter().any(|i| i.quantity == 0) { return Err(OrderError::InvalidQuantity); }
        let currency = new.items[0].unit_price.currency().to_string();
        if new.items.iter().any(|i| i.unit_price.currency() != currency) { return Err(OrderError::CurrencyMismatch); }
        new.shipping_address.validate()?;

        let order_number = new.order_number.unwrap_or_else(|| format!("ORD-{}", now.format("%Y%m%d%H%M%S%3f")));
        let mut order = Self {
            id: id.clone(), order_number, customer_id: new.customer_id, items: new.items,
            shipping_address: new.shipping_address, order_status: OrderStatus::Pending, payment_status: PaymentStatus::Pending,
            delivered_at: None, allocation: None, created_at: now, updated_at: now, events: vec![],
        };
        order.raise_event(OrderEvent::Placed { order_id: id, at: now });
        Ok(order)
    }

    pub fn id(&self) -> &OrderId { &self.id }
    pub fn order_number(&self) -> &str { &self.order_number }
    pub fn customer_id(&self) -> Option<&str> { self.customer_id.as_deref() }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn shipping_address(&self) -> &ShippingAddress { &self.shipping_address }
    pub fn status(&self) -> OrderStatus { self.order_status }
    pub fn payment_status(&self) -> PaymentStatus { self.payment_status }
    pub fn is_delivered(&self) -> bool { self.delivered_at.is_some() }
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> { self.delivered_at }
    pub fn allocation(&self) -> Option<&Allocation> { self.allocation.as_ref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    pub fn allocation_status(&self) -> WarehouseAllocationStatus {
        match self.allocation {
            Some(_) => WarehouseAllocationStatus::Allocated,
            None => WarehouseAllocationStatus::Unallocated,
        }
    }

    pub fn total(&self) -> Money {
        let currency = self.items.first().map(|i| i.unit_price.currency().to_string()).unwrap_or_else(|| "USD".into());
        self.items.iter().fold(Money::zero(&currency), |acc, i| acc.add(&i.total()).unwrap_or(acc))
    }

    pub fn line(&self, product: &ProductId, variant: Option<&VariantId>) -> Option<&LineItem> {
        self.items.iter().find(|i| i.is_for(product, variant))
    }

    /// Administrative status override. Any value is accepted from any state,
    /// except that a delivered order cannot leave `delivered`: the delivery flag never reverts.
    pub fn update_status(&mut self, status: OrderStatus, now: DateTime<Utc>) -> Result<(), OrderError> {
        if status == OrderStatus::Delivered {
            self.mark_delivered(now);
            return Ok(());
        }
        if self.is_delivered() { return Err(OrderError::DeliveredIsFinal(status)); }
        let from = self.order_status;
        self.order_status = status;
        self.touch(now);
        self.raise_event(OrderEvent::StatusChanged { order_id: self.id.clone(), from, to: status, at: now });
        Ok(())
    }

    /// Re-stamps `delivered_at` when called on an already delivered order.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) {
        let redelivered = self.is_delivered();
        let from = self.order_status;
        self.delivered_at = Some(now);
        self.order_status = OrderStatus::Delivered;
        self.touch(now);
        if from != OrderStatus::Delivered {
            self.raise_event(OrderEvent::StatusChanged { order_id: self.id.clone(), from, to: OrderStatus::Delivered, at: now });
        }
        self.raise_event(OrderEvent::Delivered { order_id: self.id.clone(), at: now, redelivered });
    }

    /// Binds the order to a warehouse. Overwrites any earlier allocation.
    pub fn allocate(&mut self, warehouse_id: WarehouseId, by: StaffId, now: DateTime<Utc>) {
        let previous = self.allocation.take().map(|a| a.warehouse_id);
        self.allocation = Some(Allocation { warehouse_id: warehouse_id.clone(), allocated_by: by.clone(), allocated_at: now });
        self.touch(now);
        self.raise_event(OrderEvent::WarehouseAllocated { order_id: self.id.clone(), warehouse_id, previous, by, at: now });
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: OrderEvent) { self.events.push(DomainEvent::Order(e)); }
    fn touch(&mut self, now: DateTime<Utc>) { self.updated_at = now; }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    NoItems,
    #[error("line item quantity must be at least 1")]
    InvalidQuantity,
    #[error("all line items must share one currency")]
    CurrencyMismatch,
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("unknown order status '{0}'")]
    UnknownStatus(String),
    #[error("order is delivered and cannot be moved to '{0}'")]
    DeliveredIsFinal(OrderStatus),
}
