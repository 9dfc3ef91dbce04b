use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainResult;
use crate::domain::repositories::CartRepository;

pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn get(&self, user_id: Uuid) -> DomainResult<Cart> {
        let rows: Vec<(Uuid, i32, DateTime<Utc>)> = sqlx::query_as(
            "SELECT product_id, quantity, updated_at FROM cart_items WHERE user_id = $1 ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Cart::new(user_id));
        }

        let updated_at = rows
            .iter()
            .map(|(_, _, at)| *at)
            .max()
            .unwrap_or_else(Utc::now);
        let items = rows
            .into_iter()
            .map(|(product_id, quantity, _)| CartItem {
                product_id,
                quantity,
            })
            .collect();

        Ok(Cart::from_persistence(user_id, items, updated_at))
    }

    async fn save(&self, cart: &Cart) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(cart.user_id())
            .execute(&mut *tx)
            .await?;

        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (user_id, product_id, quantity, position, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(cart.user_id())
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(position as i32)
            .bind(cart.updated_at())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
