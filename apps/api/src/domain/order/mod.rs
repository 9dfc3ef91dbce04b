// Order domain module
// Order aggregate, status machine, pricing and domain events

#![allow(clippy::module_inception)]

pub mod events;
pub mod order;
pub mod pricing;
pub mod value_objects;

pub use events::OrderEvent;
pub use order::{Order, OrderItem, ShippingAddress};
pub use pricing::{compute_totals, PricingRules, Totals};
pub use value_objects::OrderStatus;
