//! In-memory store used by tests and by the service when no database is configured.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{OrderStore, ReturnStore, StoreResult, WarehouseStore};
use crate::domain::aggregates::{Order, ReturnRequest, ReturnStatus, Warehouse};
use crate::domain::value_objects::{OrderId, ProductId, ReturnId, VariantId, WarehouseId};
use crate::query::{OrderFilter, ReturnFilter};

#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    returns: RwLock<HashMap<ReturnId, ReturnRequest>>,
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_warehouses(warehouses: impl IntoIterator<Item = Warehouse>) -> Self {
        let directory = warehouses.into_iter().map(|w| (w.id.clone(), w)).collect();
        Self { warehouses: RwLock::new(directory), ..Self::default() }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn save(&self, order: &Order) -> StoreResult<()> {
        self.orders.write().await.insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &OrderId) -> StoreResult<bool> {
        Ok(self.orders.write().await.remove(id).is_some())
    }

    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut found: Vec<Order> = self.orders.read().await.values().filter(|o| filter.matches(o)).cloned().collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(a.id())));
        Ok(found)
    }
}

#[async_trait]
impl ReturnStore for MemoryStore {
    async fn save(&self, request: &ReturnRequest) -> StoreResult<()> {
        self.returns.write().await.insert(request.id().clone(), request.clone());
        Ok(())
    }

    async fn get(&self, id: &ReturnId) -> StoreResult<Option<ReturnRequest>> {
        Ok(self.returns.read().await.get(id).cloned())
    }

    async fn find(&self, filter: &ReturnFilter) -> StoreResult<(Vec<ReturnRequest>, u64)> {
        let mut found: Vec<ReturnRequest> = self.returns.read().await.values().filter(|r| filter.matches(r)).cloned().collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(a.id())));
        let total = found.len() as u64;
        let page = found
            .into_iter()
            .skip(filter.page.offset() as usize)
            .take(filter.page.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn count_for_order(&self, order_id: &OrderId) -> StoreResult<u64> {
        Ok(self.returns.read().await.values().filter(|r| r.order_id() == order_id).count() as u64)
    }

    async fn returned_quantity(&self, order_id: &OrderId, product_id: &ProductId, variant_id: Option<&VariantId>) -> StoreResult<u64> {
        Ok(self
            .returns
            .read()
            .await
            .values()
            .filter(|r| r.order_id() == order_id && r.product_id() == product_id && r.variant_id() == variant_id)
            .filter(|r| r.status() != ReturnStatus::Rejected)
            .map(|r| u64::from(r.quantity()))
            .sum())
    }
}

#[async_trait]
impl WarehouseStore for MemoryStore {
    async fn get(&self, id: &WarehouseId) -> StoreResult<Option<Warehouse>> {
        Ok(self.warehouses.read().await.get(id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Warehouse>> {
        let mut all: Vec<Warehouse> = self.warehouses.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::tests::new_order;
    use crate::domain::aggregates::{NewReturn, OrderStatus, RefundStatus};
    use crate::query::{DateRange, PageRequest};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn at(day: u32, h: u32, m: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, h, m, s).unwrap() + Duration::milliseconds(ms)
    }

    async fn seed_order(store: &MemoryStore, id: &str, name: &str, created: DateTime<Utc>) -> Order {
        let mut new = new_order();
        new.shipping_address.full_name = name.into();
        let order = Order::place(id.into(), new, created).unwrap();
        OrderStore::save(store, &order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_order_find_day_boundaries() {
        let store = MemoryStore::new();
        seed_order(&store, "before", "A", at(4, 23, 59, 59, 999)).await;
        seed_order(&store, "first", "B", at(5, 0, 0, 0, 0)).await;
        seed_order(&store, "last", "C", at(5, 23, 59, 59, 999)).await;
        seed_order(&store, "after", "D", at(6, 0, 0, 0, 0)).await;

        let day = NaiveDate::from_ymd_opt(2024, 3, 5);
        let filter = OrderFilter { created: DateRange::days(day, day).unwrap(), ..Default::default() };
        let ids: Vec<String> = OrderStore::find(&store, &filter).await.unwrap().iter().map(|o| o.id().to_string()).collect();
        assert_eq!(ids, vec!["last", "first"]);
    }

    #[tokio::test]
    async fn test_order_find_by_search_and_status() {
        let store = MemoryStore::new();
        seed_order(&store, "O1", "Ada Obi", at(1, 9, 0, 0, 0)).await;
        let mut shipped = seed_order(&store, "O2", "Bola Ade", at(2, 9, 0, 0, 0)).await;
        shipped.update_status(OrderStatus::Shipped, at(2, 10, 0, 0, 0)).unwrap();
        OrderStore::save(&store, &shipped).await.unwrap();

        let by_name = OrderFilter { search: Some("ADA".into()), ..Default::default() };
        assert_eq!(OrderStore::find(&store, &by_name).await.unwrap().len(), 1);
        let by_phone = OrderFilter { search: Some("5550101".into()), ..Default::default() };
        assert_eq!(OrderStore::find(&store, &by_phone).await.unwrap().len(), 2);

        let by_status = OrderFilter { status: Some(OrderStatus::Shipped), ..Default::default() };
        let found = OrderStore::find(&store, &by_status).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "O2");
    }

    #[tokio::test]
    async fn test_return_find_paginates_newest_first() {
        let store = MemoryStore::new();
        for i in 0..5u32 {
            let new = NewReturn { order_id: "O1".into(), product_id: "P1".into(), variant_id: None, quantity: 1, reason: "damaged".into() };
            let mut r = ReturnRequest::open(format!("R{i}").into(), new, at(1 + i, 8, 0, 0, 0)).unwrap();
            if i % 2 == 0 { r.set_refund_status(RefundStatus::Refunded, at(10, 0, 0, 0, 0)); }
            ReturnStore::save(&store, &r).await.unwrap();
        }

        let filter = ReturnFilter { page: PageRequest::new(Some(2), Some(2)), ..Default::default() };
        let (page, total) = ReturnStore::find(&store, &filter).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.iter().map(|r| r.id().as_str()).collect::<Vec<_>>(), vec!["R2", "R1"]);

        let refunded = ReturnFilter { refund_status: Some(RefundStatus::Refunded), ..Default::default() };
        assert_eq!(ReturnStore::find(&store, &refunded).await.unwrap().1, 3);
        assert_eq!(store.count_for_order(&"O1".into()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_returned_quantity_skips_rejected_and_other_lines() {
        let store = MemoryStore::new();
        let line = |variant: Option<&str>, quantity| NewReturn {
            order_id: "O1".into(), product_id: "P1".into(), variant_id: variant.map(Into::into), quantity, reason: "damaged".into(),
        };
        let t = at(1, 8, 0, 0, 0);
        ReturnStore::save(&store, &ReturnRequest::open("R1".into(), line(Some("P1-RED"), 2), t).unwrap()).await.unwrap();
        let mut rejected = ReturnRequest::open("R2".into(), line(Some("P1-RED"), 3), t).unwrap();
        rejected.decide(crate::domain::aggregates::ReturnDecision::Rejected, t, t).unwrap();
        ReturnStore::save(&store, &rejected).await.unwrap();
        ReturnStore::save(&store, &ReturnRequest::open("R3".into(), line(None, 4), t).unwrap()).await.unwrap();

        let red = VariantId::from("P1-RED");
        assert_eq!(store.returned_quantity(&"O1".into(), &"P1".into(), Some(&red)).await.unwrap(), 2);
        assert_eq!(store.returned_quantity(&"O1".into(), &"P1".into(), None).await.unwrap(), 4);
        assert_eq!(store.returned_quantity(&"O2".into(), &"P1".into(), Some(&red)).await.unwrap(), 0);
    }
}
