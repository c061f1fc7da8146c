//! Postgres document store.
//!
//! Aggregates live in a JSONB `doc` column. The columns next to it are projections
//! refreshed on every save and exist only for filtering and ordering.

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};

use super::{OrderStore, ReturnStore, StoreResult, WarehouseStore};
use crate::domain::aggregates::{Order, ReturnRequest, Warehouse};
use crate::domain::value_objects::{OrderId, ProductId, ReturnId, VariantId, WarehouseId};
use crate::query::{OrderFilter, ReturnFilter};

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Upserts directory entries by id.
    pub async fn seed_warehouses(&self, warehouses: &[Warehouse]) -> StoreResult<()> {
        for w in warehouses {
            sqlx::query(
                "INSERT INTO warehouses (id, name, location) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, location = EXCLUDED.location",
            )
            .bind(w.id.as_str())
            .bind(&w.name)
            .bind(&w.location)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

/// Escapes `ILIKE` wildcards so the term is matched literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') { escaped.push('\\'); }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_order_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        qb.push(" AND (shipping_name ILIKE ").push_bind(pattern.clone());
        qb.push(" OR shipping_phone ILIKE ").push_bind(pattern).push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND order_status = ").push_bind(status.as_str());
    }
    if let Some(from) = filter.created.from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.created.to {
        qb.push(" AND created_at <= ").push_bind(to);
    }
}

fn push_return_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReturnFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(refund) = filter.refund_status {
        qb.push(" AND refund_status = ").push_bind(refund.as_str());
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn save(&self, order: &Order) -> StoreResult<()> {
        let address = order.shipping_address();
        sqlx::query(
            "INSERT INTO orders (id, order_status, shipping_name, shipping_phone, created_at, updated_at, doc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET order_status = EXCLUDED.order_status, updated_at = EXCLUDED.updated_at, doc = EXCLUDED.doc",
        )
        .bind(order.id().as_str())
        .bind(order.status().as_str())
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(order.created_at())
        .bind(order.updated_at())
        .bind(Json(order))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, (Json<Order>,)>("SELECT doc FROM orders WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(order),)| order))
    }

    async fn delete(&self, id: &OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id.as_str()).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM orders WHERE TRUE");
        push_order_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        let rows = qb.build_query_as::<(Json<Order>,)>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|(Json(order),)| order).collect())
    }
}

#[async_trait]
impl ReturnStore for PgStore {
    async fn save(&self, request: &ReturnRequest) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO returns (id, order_id, status, refund_status, created_at, updated_at, doc) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, refund_status = EXCLUDED.refund_status, \
             updated_at = EXCLUDED.updated_at, doc = EXCLUDED.doc",
        )
        .bind(request.id().as_str())
        .bind(request.order_id().as_str())
        .bind(request.status().as_str())
        .bind(request.refund_status().as_str())
        .bind(request.created_at())
        .bind(request.updated_at())
        .bind(Json(request))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: &ReturnId) -> StoreResult<Option<ReturnRequest>> {
        let row = sqlx::query_as::<_, (Json<ReturnRequest>,)>("SELECT doc FROM returns WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(Json(request),)| request))
    }

    async fn find(&self, filter: &ReturnFilter) -> StoreResult<(Vec<ReturnRequest>, u64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM returns WHERE TRUE");
        push_return_filter(&mut count, filter);
        let (total,) = count.build_query_as::<(i64,)>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM returns WHERE TRUE");
        push_return_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(filter.page.limit))
            .push(" OFFSET ")
            .push_bind(filter.page.offset() as i64);
        let rows = qb.build_query_as::<(Json<ReturnRequest>,)>().fetch_all(&self.pool).await?;
        Ok((rows.into_iter().map(|(Json(request),)| request).collect(), total.max(0) as u64))
    }

    async fn count_for_order(&self, order_id: &OrderId) -> StoreResult<u64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM returns WHERE order_id = $1")
            .bind(order_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn returned_quantity(&self, order_id: &OrderId, product_id: &ProductId, variant_id: Option<&VariantId>) -> StoreResult<u64> {
        let (sum,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COALESCE(SUM((doc->>'quantity')::BIGINT), 0)::BIGINT FROM returns \
             WHERE order_id = $1 AND status <> 'rejected' \
             AND doc->>'productId' = $2 AND doc->>'variantId' IS NOT DISTINCT FROM $3",
        )
        .bind(order_id.as_str())
        .bind(product_id.as_str())
        .bind(variant_id.map(VariantId::as_str))
        .fetch_one(&self.pool)
        .await?;
        Ok(sum.max(0) as u64)
    }
}

#[async_trait]
impl WarehouseStore for PgStore {
    async fn get(&self, id: &WarehouseId) -> StoreResult<Option<Warehouse>> {
        let row = sqlx::query_as::<_, (String, String, String)>("SELECT id, name, location FROM warehouses WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id, name, location)| Warehouse::new(id, name, location)))
    }

    async fn list(&self) -> StoreResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, (String, String, String)>("SELECT id, name, location FROM warehouses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name, location)| Warehouse::new(id, name, location)).collect())
    }
}
