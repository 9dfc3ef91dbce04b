// Application layer
// Use cases that coordinate several repositories and gateways

pub mod orders;
pub mod payments;

pub use orders::{change_order_status, CreateOrderInput, CreateOrderUseCase};
pub use payments::{PaymentService, PseNotification};
