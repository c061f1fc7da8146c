//! Warehouse allocation.
//!
//! Allocation is a correction-friendly overwrite: allocating an already allocated
//! order rebinds it and re-stamps who did it and when. Inventory is not reserved.

use chrono::Utc;
use tracing::info;

use crate::domain::aggregates::Order;
use crate::domain::value_objects::{OrderId, StaffId, WarehouseId};
use crate::publisher::EventPublisher;
use crate::store::Repositories;
use crate::{FulfillmentError, Result};

#[derive(Clone)]
pub struct AllocationService {
    repos: Repositories,
    publisher: EventPublisher,
}

fn present<T: AsRef<str>>(value: Option<T>) -> Option<T> {
    value.filter(|v| !v.as_ref().trim().is_empty())
}

impl AllocationService {
    pub fn new(repos: Repositories, publisher: EventPublisher) -> Self { Self { repos, publisher } }

    pub async fn allocate(&self, order_id: &OrderId, warehouse_id: Option<WarehouseId>, actor: Option<StaffId>) -> Result<Order> {
        let warehouse_id = present(warehouse_id).ok_or_else(|| FulfillmentError::invalid_argument("warehouseId is required"))?;
        let actor = present(actor).ok_or_else(|| FulfillmentError::invalid_argument("acting staff identity is required"))?;

        let mut order = self.repos.orders.get(order_id).await?.ok_or_else(|| FulfillmentError::not_found("order", order_id))?;
        if self.repos.warehouses.get(&warehouse_id).await?.is_none() {
            return Err(FulfillmentError::not_found("warehouse", &warehouse_id));
        }

        let previous = order.allocation().map(|a| a.warehouse_id.clone());
        order.allocate(warehouse_id.clone(), actor.clone(), Utc::now());
        self.repos.orders.save(&order).await?;
        self.publisher.publish(order.take_events()).await;

        info!(order_id = %order_id, warehouse_id = %warehouse_id, previous = ?previous, allocated_by = %actor, "order allocated to warehouse");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::tests::new_order;
    use crate::domain::aggregates::{Warehouse, WarehouseAllocationStatus};
    use crate::services::OrderService;
    use crate::ErrorKind;

    fn services() -> (OrderService, AllocationService) {
        let repos = Repositories::in_memory(vec![
            Warehouse::new("WH1", "Lagos Central", "Ikeja"),
            Warehouse::new("WH2", "Abuja North", "Kubwa"),
        ]);
        (OrderService::new(repos.clone(), EventPublisher::log_only()), AllocationService::new(repos, EventPublisher::log_only()))
    }

    #[tokio::test]
    async fn test_allocate_stamps_actor() {
        let (orders, allocation) = services();
        let order = orders.place_order(new_order()).await.unwrap();
        let allocated = allocation.allocate(order.id(), Some("WH1".into()), Some("staff1".into())).await.unwrap();
        assert_eq!(allocated.allocation_status(), WarehouseAllocationStatus::Allocated);
        let a = allocated.allocation().unwrap();
        assert_eq!(a.warehouse_id.as_str(), "WH1");
        assert_eq!(a.allocated_by.as_str(), "staff1");
    }

    #[tokio::test]
    async fn test_reallocation_overwrites() {
        let (orders, allocation) = services();
        let order = orders.place_order(new_order()).await.unwrap();
        allocation.allocate(order.id(), Some("WH1".into()), Some("staff1".into())).await.unwrap();
        allocation.allocate(order.id(), Some("WH2".into()), Some("staff2".into())).await.unwrap();
        let stored = orders.get_order(order.id()).await.unwrap();
        let a = stored.order.allocation().unwrap();
        assert_eq!(a.warehouse_id.as_str(), "WH2");
        assert_eq!(a.allocated_by.as_str(), "staff2");
        assert_eq!(stored.warehouse.unwrap().name, "Abuja North");
    }

    #[tokio::test]
    async fn test_allocate_requires_ids() {
        let (orders, allocation) = services();
        let order = orders.place_order(new_order()).await.unwrap();
        let err = allocation.allocate(order.id(), None, Some("staff1".into())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = allocation.allocate(order.id(), Some("WH1".into()), Some(" ".into())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        // argument checks run before the order lookup
        let err = allocation.allocate(&"missing".into(), None, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let unchanged = orders.get_order(order.id()).await.unwrap().order;
        assert_eq!(unchanged.allocation_status(), WarehouseAllocationStatus::Unallocated);
    }

    #[tokio::test]
    async fn test_allocate_unknown_entities() {
        let (orders, allocation) = services();
        let err = allocation.allocate(&"missing".into(), Some("WH1".into()), Some("staff1".into())).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let order = orders.place_order(new_order()).await.unwrap();
        let err = allocation.allocate(order.id(), Some("WH9".into()), Some("staff1".into())).await.unwrap_err();
        assert_eq!(err.to_string(), "warehouse 'WH9' not found");
    }
}
