use std::sync::Arc;

use sqlx::PgPool;

use crate::application::{CreateOrderUseCase, PaymentService};
use crate::config::AppConfig;
use crate::domain::payment::PseGateway;
use crate::domain::repositories::{
    AddressRepository, CartRepository, CategoryRepository, OrderRepository, PaymentRepository,
    ProductRepository, UserRepository,
};
use crate::infrastructure::payments::StripeStub;
use crate::infrastructure::repositories::{
    InMemoryAddressRepository, InMemoryCartRepository, InMemoryCategoryRepository,
    InMemoryOrderRepository, InMemoryPaymentRepository, InMemoryProductRepository,
    InMemoryUserRepository, PostgresAddressRepository, PostgresCartRepository,
    PostgresCategoryRepository, PostgresOrderRepository, PostgresPaymentRepository,
    PostgresProductRepository, PostgresUserRepository,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub pse: Arc<dyn PseGateway>,
    pub stripe: StripeStub,
}

impl AppState {
    /// State backed by PostgreSQL repositories
    pub fn postgres(pool: PgPool, config: AppConfig, pse: Arc<dyn PseGateway>) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            addresses: Arc::new(PostgresAddressRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            products: Arc::new(PostgresProductRepository::new(pool.clone())),
            carts: Arc::new(PostgresCartRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool)),
            pse,
            stripe: StripeStub::new(),
        }
    }

    /// State backed by the in-memory repositories
    pub fn in_memory(config: AppConfig, pse: Arc<dyn PseGateway>) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(InMemoryUserRepository::new()),
            addresses: Arc::new(InMemoryAddressRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            carts: Arc::new(InMemoryCartRepository::new()),
            orders: Arc::new(InMemoryOrderRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            pse,
            stripe: StripeStub::new(),
        }
    }

    pub fn create_order(&self) -> CreateOrderUseCase<'_> {
        CreateOrderUseCase {
            carts: self.carts.as_ref(),
            addresses: self.addresses.as_ref(),
            products: self.products.as_ref(),
            orders: self.orders.as_ref(),
            pricing: &self.config.pricing,
        }
    }

    pub fn payment_service(&self) -> PaymentService<'_> {
        PaymentService {
            orders: self.orders.as_ref(),
            products: self.products.as_ref(),
            payments: self.payments.as_ref(),
            pse: self.pse.as_ref(),
            stripe: &self.stripe,
            return_url: &self.config.pse.return_url,
        }
    }
}
