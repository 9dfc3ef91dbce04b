// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_address_repository;
pub mod postgres_cart_repository;
pub mod postgres_category_repository;
pub mod postgres_order_repository;
pub mod postgres_payment_repository;
pub mod postgres_product_repository;
pub mod postgres_user_repository;

pub use in_memory::{
    InMemoryAddressRepository, InMemoryCartRepository, InMemoryCategoryRepository,
    InMemoryOrderRepository, InMemoryPaymentRepository, InMemoryProductRepository,
    InMemoryUserRepository,
};
pub use postgres_address_repository::PostgresAddressRepository;
pub use postgres_cart_repository::PostgresCartRepository;
pub use postgres_category_repository::PostgresCategoryRepository;
pub use postgres_order_repository::PostgresOrderRepository;
pub use postgres_payment_repository::PostgresPaymentRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_user_repository::PostgresUserRepository;
