use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::domain::repositories::PaymentRepository;

const PAYMENT_COLUMNS: &str = "id, order_id, method, status, amount, currency, provider_reference, \
     redirect_url, raw_status, created_at, updated_at";

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    method: PaymentMethod,
    status: PaymentStatus,
    amount: Decimal,
    currency: String,
    provider_reference: Option<String>,
    redirect_url: Option<String>,
    raw_status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(r: PaymentRow) -> Self {
        Payment {
            id: r.id,
            order_id: r.order_id,
            method: r.method,
            status: r.status,
            amount: r.amount,
            currency: r.currency,
            provider_reference: r.provider_reference,
            redirect_url: r.redirect_url,
            raw_status: r.raw_status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create(&self, payment: &Payment) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, method, status, amount, currency, provider_reference,
                redirect_url, raw_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id)
        .bind(payment.order_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.provider_reference)
        .bind(&payment.redirect_url)
        .bind(&payment.raw_status)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, payment: &Payment) -> DomainResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, provider_reference = $3, redirect_url = $4, raw_status = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(payment.id)
        .bind(payment.status)
        .bind(&payment.provider_reference)
        .bind(&payment.redirect_url)
        .bind(&payment.raw_status)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Payment", payment.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>> {
        let query = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    async fn find_by_provider_reference(
        &self,
        method: PaymentMethod,
        reference: &str,
    ) -> DomainResult<Option<Payment>> {
        let query = format!(
            "SELECT {} FROM payments WHERE method = $1 AND provider_reference = $2",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(method)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Payment::from))
    }

    async fn list_for_order(&self, order_id: Uuid) -> DomainResult<Vec<Payment>> {
        let query = format!(
            "SELECT {} FROM payments WHERE order_id = $1 ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
