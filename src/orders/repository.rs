use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::clock::DateRange;
use crate::inventory::models::ProductRef;
use crate::orders::error::OrderError;
use crate::orders::models::{NewOrder, NewOrderItem, Order, OrderDetails, OrderItem};
use crate::orders::query::{OrderFilters, OrderQueryBuilder, ORDER_COLUMNS};

/// One page of a store's orders plus the unpaginated row count
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// Persistence for orders and their items
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert an order and all its items atomically
    async fn insert(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<OrderDetails, OrderError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError>;
    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError>;
    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, OrderError>;
    /// Overwrite the status; `OrderNotFound` when no row matched
    async fn update_status(&self, id: Uuid, status: &str) -> Result<Order, OrderError>;
    /// Delete an order, its items cascade
    async fn delete(&self, id: Uuid) -> Result<(), OrderError>;
    async fn count_in_range(&self, store_id: Uuid, range: &DateRange) -> Result<i64, OrderError>;
    async fn list_paginated(&self, store_id: Uuid, filters: &OrderFilters) -> Result<OrderPage, OrderError>;
    /// Every order of the store, newest first, optionally within `range`
    async fn list_all(&self, store_id: Uuid, range: Option<&DateRange>) -> Result<Vec<Order>, OrderError>;
    async fn recent(&self, store_id: Uuid, limit: i64) -> Result<Vec<Order>, OrderError>;
}

const ITEM_COLUMNS: &str =
    "id, order_id, product_type, store_product_id, store_product_custom_id, name, img_url, price, quantity";

/// Repository for order operations
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<OrderDetails, OrderError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders
                (order_number, store_id, status, customer_name, customer_phone, payment_method,
                 total, is_delivery, delivery_street, delivery_number, delivery_neighborhood, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, COALESCE($12, NOW()))
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order.order_number)
        .bind(order.store_id)
        .bind(&order.status)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.payment_method)
        .bind(order.total)
        .bind(order.is_delivery)
        .bind(&order.delivery_street)
        .bind(&order.delivery_number)
        .bind(&order.delivery_neighborhood)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut persisted = Vec::with_capacity(items.len());
        for item in items {
            let (store_product_id, custom_id) = match item.product_ref {
                ProductRef::Catalog(id) => (Some(id), None),
                ProductRef::Custom(id) => (None, Some(id)),
            };

            let row = sqlx::query_as::<_, OrderItem>(&format!(
                r#"
                INSERT INTO order_items
                    (order_id, product_type, store_product_id, store_product_custom_id, name, img_url, price, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {}
                "#,
                ITEM_COLUMNS
            ))
            .bind(created.id)
            .bind(item.product_ref.product_type())
            .bind(store_product_id)
            .bind(custom_id)
            .bind(&item.name)
            .bind(&item.img_url)
            .bind(item.price)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;

            persisted.push(row);
        }

        tx.commit().await?;

        Ok(OrderDetails {
            order: created,
            items: persisted,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = $1",
            ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, OrderError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = ANY($1)",
            ITEM_COLUMNS
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::OrderNotFound)?;

        Ok(order)
    }

    async fn delete(&self, id: Uuid) -> Result<(), OrderError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::OrderNotFound);
        }
        Ok(())
    }

    async fn count_in_range(&self, store_id: Uuid, range: &DateRange) -> Result<i64, OrderError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE store_id = $1 AND created_at BETWEEN $2 AND $3",
        )
        .bind(store_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_paginated(&self, store_id: Uuid, filters: &OrderFilters) -> Result<OrderPage, OrderError> {
        let mut builder = OrderQueryBuilder::for_store(store_id);
        filters.apply(&mut builder);

        let (query, params) = builder.build();
        let mut page_query = sqlx::query_as::<_, Order>(&query);
        for param in &params {
            page_query = page_query.bind(param);
        }
        let orders = page_query.fetch_all(&self.pool).await?;

        let (count_sql, params) = builder.build_count();
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(OrderPage { orders, total })
    }

    async fn list_all(&self, store_id: Uuid, range: Option<&DateRange>) -> Result<Vec<Order>, OrderError> {
        let orders = match range {
            Some(range) => {
                sqlx::query_as::<_, Order>(&format!(
                    r#"
                    SELECT {} FROM orders
                    WHERE store_id = $1 AND created_at BETWEEN $2 AND $3
                    ORDER BY created_at DESC
                    "#,
                    ORDER_COLUMNS
                ))
                .bind(store_id)
                .bind(range.from)
                .bind(range.to)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {} FROM orders WHERE store_id = $1 ORDER BY created_at DESC",
                    ORDER_COLUMNS
                ))
                .bind(store_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(orders)
    }

    async fn recent(&self, store_id: Uuid, limit: i64) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE store_id = $1 ORDER BY created_at DESC LIMIT $2",
            ORDER_COLUMNS
        ))
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
