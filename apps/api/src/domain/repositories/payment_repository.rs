use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::payment::{Payment, PaymentMethod};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> DomainResult<()>;

    /// Persist status, provider data and raw status
    async fn update(&self, payment: &Payment) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Payment>>;

    async fn find_by_provider_reference(
        &self,
        method: PaymentMethod,
        reference: &str,
    ) -> DomainResult<Option<Payment>>;

    /// Payments of an order, newest first
    async fn list_for_order(&self, order_id: Uuid) -> DomainResult<Vec<Payment>>;
}
