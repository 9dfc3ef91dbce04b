use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::AddressRepository;
use crate::domain::user::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, label, recipient, line1, line2, city, department, \
     postal_code, phone, is_default, created_at";

pub struct PostgresAddressRepository {
    pool: PgPool,
}

impl PostgresAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    label: Option<String>,
    recipient: String,
    line1: String,
    line2: Option<String>,
    city: String,
    department: String,
    postal_code: Option<String>,
    phone: Option<String>,
    is_default: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AddressRow> for Address {
    fn from(r: AddressRow) -> Self {
        Address {
            id: r.id,
            user_id: r.user_id,
            label: r.label,
            recipient: r.recipient,
            line1: r.line1,
            line2: r.line2,
            city: r.city,
            department: r.department,
            postal_code: r.postal_code,
            phone: r.phone,
            is_default: r.is_default,
            created_at: r.created_at,
        }
    }
}

#[async_trait]
impl AddressRepository for PostgresAddressRepository {
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Address>> {
        let query = format!(
            "SELECT {} FROM addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at",
            ADDRESS_COLUMNS
        );
        let rows = sqlx::query_as::<_, AddressRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Address>> {
        let query = format!("SELECT {} FROM addresses WHERE id = $1", ADDRESS_COLUMNS);
        let row = sqlx::query_as::<_, AddressRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Address::from))
    }

    async fn create(&self, address: &Address) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        if address.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
                .bind(address.user_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, user_id, label, recipient, line1, line2, city, department,
                postal_code, phone, is_default, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.label)
        .bind(&address.recipient)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.department)
        .bind(&address.postal_code)
        .bind(&address.phone)
        .bind(address.is_default)
        .bind(address.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Address", id));
        }
        Ok(())
    }
}
