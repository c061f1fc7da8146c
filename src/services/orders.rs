//! Order administration: status overrides, delivery confirmation, deletion and listing.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::aggregates::{NewOrder, Order, OrderStatus, Warehouse};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::OrderId;
use crate::publisher::EventPublisher;
use crate::query::OrderFilter;
use crate::store::Repositories;
use crate::{FulfillmentError, Result};

/// An order joined with the warehouse it is allocated to.
#[derive(Clone, Debug, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub warehouse: Option<Warehouse>,
}

#[derive(Clone)]
pub struct OrderService {
    repos: Repositories,
    publisher: EventPublisher,
}

impl OrderService {
    pub fn new(repos: Repositories, publisher: EventPublisher) -> Self { Self { repos, publisher } }

    pub async fn place_order(&self, new: NewOrder) -> Result<Order> {
        let mut order = Order::place(OrderId::generate(), new, Utc::now())?;
        self.commit(&mut order).await?;
        info!(order_id = %order.id(), order_number = order.order_number(), "order placed");
        Ok(order)
    }

    pub async fn get_order(&self, id: &OrderId) -> Result<OrderDetails> {
        let order = self.load(id).await?;
        let warehouse = match order.allocation() {
            Some(a) => self.repos.warehouses.get(&a.warehouse_id).await?,
            None => None,
        };
        Ok(OrderDetails { order, warehouse })
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        Ok(self.repos.orders.find(filter).await?)
    }

    /// Sets any status from any state. Every change is audit-logged through its event.
    pub async fn update_status(&self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self.load(id).await?;
        let from = order.status();
        order.update_status(status, Utc::now())?;
        self.commit(&mut order).await?;
        info!(order_id = %id, %from, to = %status, "order status updated");
        Ok(order)
    }

    /// Repeated calls keep the status and re-stamp `delivered_at`.
    pub async fn mark_delivered(&self, id: &OrderId) -> Result<Order> {
        let mut order = self.load(id).await?;
        if order.is_delivered() {
            warn!(order_id = %id, "order already delivered, re-stamping delivery time");
        }
        order.mark_delivered(Utc::now());
        self.commit(&mut order).await?;
        Ok(order)
    }

    /// Hard delete. Returns that reference the order are left in place.
    pub async fn delete_order(&self, id: &OrderId) -> Result<()> {
        let orphaned_returns = self.repos.returns.count_for_order(id).await?;
        if !self.repos.orders.delete(id).await? {
            return Err(FulfillmentError::not_found("order", id));
        }
        if orphaned_returns > 0 {
            warn!(order_id = %id, orphaned_returns, "deleted order still referenced by returns");
        }
        let event = DomainEvent::Order(OrderEvent::Deleted { order_id: id.clone(), orphaned_returns });
        self.publisher.publish(vec![event]).await;
        Ok(())
    }

    async fn load(&self, id: &OrderId) -> Result<Order> {
        self.repos.orders.get(id).await?.ok_or_else(|| FulfillmentError::not_found("order", id))
    }

    async fn commit(&self, order: &mut Order) -> Result<()> {
        self.repos.orders.save(order).await?;
        self.publisher.publish(order.take_events()).await;
        Ok(())
    }
}
