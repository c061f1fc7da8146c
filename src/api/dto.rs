//! Request bodies, query strings and response views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{
    LineItem, NewOrder, NewReturn, Order, OrderStatus, PaymentStatus, PickupUpdate, RefundStatus, ReturnRequest,
    ReturnStatus, Warehouse, WarehouseAllocationStatus,
};
use crate::domain::value_objects::{parse_timestamp, Money, OrderId, ProductId, ReturnId, ShippingAddress, StaffId, VariantId, WarehouseId};
use crate::query::{parse_day, DateRange, OrderFilter, PageRequest, ReturnFilter};
use crate::services::{OrderDetails, OrderSummary, ReturnDetails};
use crate::FulfillmentError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub order_number: Option<String>,
    pub customer_id: Option<String>,
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<LineItemRequest>,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency: Option<String>,
}

impl From<PlaceOrderRequest> for NewOrder {
    fn from(r: PlaceOrderRequest) -> Self {
        let items = r
            .items
            .into_iter()
            .map(|i| LineItem {
                product_id: ProductId::from(i.product_id),
                variant_id: i.variant_id.map(VariantId::from),
                title: i.title,
                variant_title: i.variant_title,
                quantity: i.quantity,
                unit_price: Money::new(i.unit_price, i.currency.as_deref().unwrap_or("USD")),
            })
            .collect();
        NewOrder { order_number: r.order_number, customer_id: r.customer_id, items, shipping_address: r.shipping_address }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest { pub status: Option<String> }

impl UpdateOrderStatusRequest {
    pub fn status(&self) -> Result<OrderStatus, FulfillmentError> {
        let raw = self.status.as_deref().ok_or_else(|| FulfillmentError::invalid_argument("status is required"))?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateWarehouseRequest { pub warehouse_id: Option<String> }

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<OrderListQuery> for OrderFilter {
    type Error = FulfillmentError;
    fn try_from(q: OrderListQuery) -> Result<Self, Self::Error> {
        let status = q.status.as_deref().filter(|s| !s.is_empty()).map(str::parse::<OrderStatus>).transpose()?;
        let start = q.start_date.as_deref().filter(|s| !s.is_empty()).map(parse_day).transpose()?;
        let end = q.end_date.as_deref().filter(|s| !s.is_empty()).map(parse_day).transpose()?;
        Ok(OrderFilter { search: q.search, status, created: DateRange::days(start, end)? })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OpenReturnRequest {
    pub order_id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

impl From<OpenReturnRequest> for NewReturn {
    fn from(r: OpenReturnRequest) -> Self {
        NewReturn {
            order_id: OrderId::from(r.order_id),
            product_id: ProductId::from(r.product_id),
            variant_id: r.variant_id.map(VariantId::from),
            quantity: r.quantity,
            reason: r.reason,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReturnStatusRequest {
    pub status: Option<String>,
    pub processed_at: Option<String>,
}

impl UpdateReturnStatusRequest {
    pub fn processed_at(&self) -> Result<Option<DateTime<Utc>>, FulfillmentError> {
        match self.processed_at.as_deref() {
            None => Ok(None),
            Some(raw) => parse_timestamp(raw)
                .map(Some)
                .ok_or_else(|| FulfillmentError::invalid_argument(format!("invalid processedAt '{raw}'"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundStatusRequest { pub refund_status: Option<String> }

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub pickup_scheduled: Option<bool>,
    pub pickup_date: Option<String>,
    #[validate(length(max = 200))]
    pub pickup_status: Option<String>,
}

impl TryFrom<PickupRequest> for PickupUpdate {
    type Error = FulfillmentError;
    fn try_from(r: PickupRequest) -> Result<Self, Self::Error> {
        let date = match r.pickup_date.as_deref() {
            None => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| FulfillmentError::invalid_argument(format!("invalid pickupDate '{raw}'")))?),
        };
        Ok(PickupUpdate { scheduled: r.pickup_scheduled, date, status: r.pickup_status })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReturnListQuery {
    pub status: Option<String>,
    pub refund_status: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl TryFrom<ReturnListQuery> for ReturnFilter {
    type Error = FulfillmentError;
    fn try_from(q: ReturnListQuery) -> Result<Self, Self::Error> {
        let status = q.status.as_deref().filter(|s| !s.is_empty()).map(str::parse::<ReturnStatus>).transpose()?;
        let refund_status = q.refund_status.as_deref().filter(|s| !s.is_empty()).map(str::parse::<RefundStatus>).transpose()?;
        Ok(ReturnFilter { status, refund_status, page: PageRequest::new(q.page, q.limit) })
    }
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: Option<String>,
    pub items: Vec<LineItem>,
    pub total: Money,
    pub shipping_address: ShippingAddress,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub allocated_warehouse: Option<WarehouseId>,
    pub warehouse_allocation_status: WarehouseAllocationStatus,
    pub allocated_by: Option<StaffId>,
    pub allocated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<Warehouse>,
}

impl From<&Order> for OrderView {
    fn from(o: &Order) -> Self {
        let allocation = o.allocation();
        Self {
            id: o.id().clone(),
            order_number: o.order_number().to_string(),
            customer_id: o.customer_id().map(str::to_string),
            items: o.items().to_vec(),
            total: o.total(),
            shipping_address: o.shipping_address().clone(),
            order_status: o.status(),
            payment_status: o.payment_status(),
            is_delivered: o.is_delivered(),
            delivered_at: o.delivered_at(),
            allocated_warehouse: allocation.map(|a| a.warehouse_id.clone()),
            warehouse_allocation_status: o.allocation_status(),
            allocated_by: allocation.map(|a| a.allocated_by.clone()),
            allocated_at: allocation.map(|a| a.allocated_at),
            created_at: o.created_at(),
            updated_at: o.updated_at(),
            warehouse: None,
        }
    }
}

impl From<OrderDetails> for OrderView {
    fn from(d: OrderDetails) -> Self {
        Self { warehouse: d.warehouse, ..Self::from(&d.order) }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnView {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub reason: String,
    pub status: ReturnStatus,
    pub processed_at: Option<DateTime<Utc>>,
    pub refund_status: RefundStatus,
    pub refunded_at: Option<DateTime<Utc>>,
    pub pickup_scheduled: bool,
    pub pickup_date: Option<DateTime<Utc>>,
    pub pickup_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ReturnRequest> for ReturnView {
    fn from(r: &ReturnRequest) -> Self {
        let pickup = r.pickup();
        Self {
            id: r.id().clone(),
            order_id: r.order_id().clone(),
            product_id: r.product_id().clone(),
            variant_id: r.variant_id().cloned(),
            quantity: r.quantity(),
            reason: r.reason().to_string(),
            status: r.status(),
            processed_at: r.processed_at(),
            refund_status: r.refund_status(),
            refunded_at: r.refunded_at(),
            pickup_scheduled: pickup.scheduled,
            pickup_date: pickup.date,
            pickup_status: pickup.status.clone(),
            created_at: r.created_at(),
            updated_at: r.updated_at(),
        }
    }
}

/// A return with its order summary and line descriptor; both are `null` for orphans.
#[derive(Debug, Serialize)]
pub struct ReturnDetailsView {
    #[serde(flatten)]
    pub request: ReturnView,
    pub order: Option<OrderSummary>,
    pub item: Option<LineItem>,
}

impl From<ReturnDetails> for ReturnDetailsView {
    fn from(d: ReturnDetails) -> Self {
        Self { request: ReturnView::from(&d.request), order: d.order, item: d.item }
    }
}
