//! Return coordination.
//!
//! Drives a return through its decision, refund and pickup sub-states. The only
//! cross-entity check is at opening time (the order must be delivered and contain
//! the returned line); afterwards the return evolves independently of its order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::domain::aggregates::{
    LineItem, NewReturn, Order, OrderStatus, PickupUpdate, RefundStatus, ReturnDecision, ReturnRequest,
    WarehouseAllocationStatus,
};
use crate::domain::value_objects::{OrderId, ReturnId, WarehouseId};
use crate::publisher::EventPublisher;
use crate::query::{Page, PageMeta, ReturnFilter};
use crate::store::Repositories;
use crate::{FulfillmentError, Result};

/// Order fields shown next to a return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub order_status: OrderStatus,
    pub warehouse_allocation_status: WarehouseAllocationStatus,
    pub allocated_warehouse: Option<WarehouseId>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().clone(),
            order_number: order.order_number().to_string(),
            order_status: order.status(),
            warehouse_allocation_status: order.allocation_status(),
            allocated_warehouse: order.allocation().map(|a| a.warehouse_id.clone()),
        }
    }
}

/// A return joined with its order summary and returned line. Both are `None`
/// when the order has been deleted since.
#[derive(Clone, Debug)]
pub struct ReturnDetails {
    pub request: ReturnRequest,
    pub order: Option<OrderSummary>,
    pub item: Option<LineItem>,
}

impl ReturnDetails {
    fn join(request: ReturnRequest, order: Option<&Order>) -> Self {
        let item = order.and_then(|o| o.line(request.product_id(), request.variant_id())).cloned();
        Self { order: order.map(OrderSummary::from), item, request }
    }
}

#[derive(Clone)]
pub struct ReturnService {
    repos: Repositories,
    publisher: EventPublisher,
}

impl ReturnService {
    pub fn new(repos: Repositories, publisher: EventPublisher) -> Self { Self { repos, publisher } }

    pub async fn open_return(&self, new: NewReturn) -> Result<ReturnDetails> {
        let order = self.repos.orders.get(&new.order_id).await?.ok_or_else(|| FulfillmentError::not_found("order", &new.order_id))?;
        if !order.is_delivered() {
            return Err(FulfillmentError::InvalidState(format!("order '{}' has not been delivered", order.id())));
        }
        let line = order.line(&new.product_id, new.variant_id.as_ref()).ok_or_else(|| {
            FulfillmentError::invalid_argument(format!("order '{}' has no line for product '{}'", order.id(), new.product_id))
        })?;
        let already = self.repos.returns.returned_quantity(order.id(), &new.product_id, new.variant_id.as_ref()).await?;
        if already + u64::from(new.quantity) > u64::from(line.quantity) {
            return Err(FulfillmentError::invalid_argument(format!(
                "cannot return {} items, {} ordered and {} already returned",
                new.quantity, line.quantity, already
            )));
        }

        let mut request = ReturnRequest::open(ReturnId::generate(), new, Utc::now())?;
        self.commit(&mut request).await?;
        info!(return_id = %request.id(), order_id = %order.id(), "return opened");
        Ok(ReturnDetails::join(request, Some(&order)))
    }

    pub async fn get_return(&self, id: &ReturnId) -> Result<ReturnDetails> {
        let request = self.load(id).await?;
        let order = self.repos.orders.get(request.order_id()).await?;
        Ok(ReturnDetails::join(request, order.as_ref()))
    }

    pub async fn list_returns(&self, filter: &ReturnFilter) -> Result<Page<ReturnDetails>> {
        let (requests, total) = self.repos.returns.find(filter).await?;
        let mut orders: HashMap<OrderId, Option<Order>> = HashMap::new();
        for request in &requests {
            if !orders.contains_key(request.order_id()) {
                let order = self.repos.orders.get(request.order_id()).await?;
                orders.insert(request.order_id().clone(), order);
            }
        }
        let data = requests
            .into_iter()
            .map(|r| {
                let order = orders.get(r.order_id()).and_then(Option::as_ref);
                ReturnDetails::join(r, order)
            })
            .collect();
        Ok(Page { data, meta: PageMeta::new(total, filter.page) })
    }

    /// Approve or reject. `processed_at` defaults to now; callers may back-date it.
    pub async fn update_status(&self, id: &ReturnId, decision: ReturnDecision, processed_at: Option<DateTime<Utc>>) -> Result<ReturnRequest> {
        let mut request = self.load(id).await?;
        let now = Utc::now();
        if request.decide(decision, processed_at.unwrap_or(now), now)? {
            self.commit(&mut request).await?;
            info!(return_id = %id, status = %request.status(), "return decided");
        }
        Ok(request)
    }

    pub async fn mark_complete(&self, id: &ReturnId) -> Result<ReturnRequest> {
        let mut request = self.load(id).await?;
        request.complete(Utc::now())?;
        self.commit(&mut request).await?;
        info!(return_id = %id, "return completed");
        Ok(request)
    }

    /// Not tied to the decision status: a refund may be recorded before approval.
    pub async fn set_refund_status(&self, id: &ReturnId, refund_status: RefundStatus) -> Result<ReturnRequest> {
        let mut request = self.load(id).await?;
        request.set_refund_status(refund_status, Utc::now());
        self.commit(&mut request).await?;
        Ok(request)
    }

    pub async fn update_pickup(&self, id: &ReturnId, update: PickupUpdate) -> Result<ReturnRequest> {
        let mut request = self.load(id).await?;
        request.update_pickup(update, Utc::now());
        self.commit(&mut request).await?;
        Ok(request)
    }

    async fn load(&self, id: &ReturnId) -> Result<ReturnRequest> {
        self.repos.returns.get(id).await?.ok_or_else(|| FulfillmentError::not_found("return", id))
    }

    async fn commit(&self, request: &mut ReturnRequest) -> Result<()> {
        let events = request.take_events();
        if events.is_empty() { return Ok(()); }
        self.repos.returns.save(request).await?;
        self.publisher.publish(events).await;
        Ok(())
    }
}
