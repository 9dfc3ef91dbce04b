use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress, Totals};
use crate::domain::payment::PaymentMethod;
use crate::domain::repositories::{OrderRepository, OrderStats};

const ORDER_COLUMNS: &str = "id, reference, user_id, subtotal, tax, shipping, total, currency, \
     shipping_address, status, payment_method, notes, created_at, updated_at";

/// PostgreSQL implementation of OrderRepository
///
/// Orders and their items are written in one transaction.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> DomainResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT order_id, product_id, sku, name, unit_price, quantity, line_total
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for r in item_rows {
            items.entry(r.order_id).or_default().push(OrderItem {
                product_id: r.product_id,
                sku: r.sku,
                name: r.name,
                unit_price: r.unit_price,
                quantity: r.quantity,
                line_total: r.line_total,
            });
        }

        Ok(rows
            .into_iter()
            .map(|r| {
                let order_items = items.remove(&r.id).unwrap_or_default();
                r.into_order(order_items)
            })
            .collect())
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    reference: String,
    user_id: Uuid,
    subtotal: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    currency: String,
    shipping_address: Json<ShippingAddress>,
    status: OrderStatus,
    payment_method: Option<PaymentMethod>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order::from_persistence(
            self.id,
            self.reference,
            self.user_id,
            items,
            Totals {
                subtotal: self.subtotal,
                tax: self.tax,
                shipping: self.shipping,
                total: self.total,
            },
            self.currency,
            self.shipping_address.0,
            self.status,
            self.payment_method,
            self.notes,
            self.created_at,
            self.updated_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    sku: String,
    name: String,
    unit_price: Decimal,
    quantity: i32,
    line_total: Decimal,
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;
        let totals = order.totals();

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, reference, user_id, subtotal, tax, shipping, total, currency,
                shipping_address, status, payment_method, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id())
        .bind(order.reference())
        .bind(order.user_id())
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.shipping)
        .bind(totals.total)
        .bind(order.currency())
        .bind(Json(order.shipping_address()))
        .bind(order.status())
        .bind(order.payment_method())
        .bind(order.notes())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, product_id, sku, name, unit_price, quantity, line_total
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(order.id())
            .bind(position as i32)
            .bind(item.product_id)
            .bind(&item.sku)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn transition(&self, order: &Order, from: OrderStatus) -> DomainResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(order.id())
        .bind(order.status())
        .bind(order.updated_at())
        .bind(from)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1")
            .bind(order.id())
            .fetch_optional(&self.pool)
            .await?;
        match exists {
            Some(_) => Ok(false),
            None => Err(DomainError::not_found("Order", order.id())),
        }
    }

    async fn set_payment_method(&self, id: Uuid, method: PaymentMethod) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET payment_method = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(method)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Order", id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Order>> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(self.attach_items(rows).await?.pop())
    }

    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(rows).await
    }

    async fn list(&self, status: Option<OrderStatus>) -> DomainResult<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM orders WHERE ($1::order_status IS NULL OR status = $1) \
             ORDER BY created_at DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        self.attach_items(rows).await
    }

    async fn stats(&self) -> DomainResult<OrderStats> {
        let (total_orders, pending_orders, paid_revenue): (i64, i64, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'pending'),
                COALESCE(SUM(total) FILTER (
                    WHERE status IN ('paid', 'processing', 'shipped', 'delivered')
                ), 0)
            FROM orders
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderStats {
            total_orders: total_orders as u64,
            pending_orders: pending_orders as u64,
            paid_revenue,
        })
    }
}
