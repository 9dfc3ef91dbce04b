use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::PaymentMethod;

/// Aggregates for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub paid_revenue: Decimal,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order with its items
    async fn create(&self, order: &Order) -> DomainResult<()>;

    /// Persist `order`'s status only while the stored status is still `from`
    ///
    /// Returns `false` when another writer moved the order first.
    async fn transition(&self, order: &Order, from: OrderStatus) -> DomainResult<bool>;

    /// Record the payment method without touching the status
    async fn set_payment_method(&self, id: Uuid, method: PaymentMethod) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Order>>;

    /// Orders of a user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Order>>;

    /// All orders, newest first, optionally filtered by status
    async fn list(&self, status: Option<OrderStatus>) -> DomainResult<Vec<Order>>;

    async fn stats(&self) -> DomainResult<OrderStats>;
}
