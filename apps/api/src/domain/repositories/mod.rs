// Repository ports
// Implemented by adapters in the infrastructure layer

pub mod address_repository;
pub mod cart_repository;
pub mod category_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod product_repository;
pub mod user_repository;

pub use address_repository::AddressRepository;
pub use cart_repository::CartRepository;
pub use category_repository::CategoryRepository;
pub use order_repository::{OrderRepository, OrderStats};
pub use payment_repository::PaymentRepository;
pub use product_repository::{ProductRepository, StockLines};
pub use user_repository::{User, UserRepository};
