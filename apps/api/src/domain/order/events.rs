use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::OrderStatus;

/// Domain events raised by the Order aggregate
///
/// Currently only logged; kept as values so a publisher can be attached later.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    Placed {
        order_id: Uuid,
        user_id: Uuid,
        reference: String,
        total: Decimal,
    },
    StatusChanged {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },
}

impl OrderEvent {
    pub fn order_id(&self) -> Uuid {
        match self {
            OrderEvent::Placed { order_id, .. } => *order_id,
            OrderEvent::StatusChanged { order_id, .. } => *order_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::Placed { .. } => "order.placed",
            OrderEvent::StatusChanged { .. } => "order.status_changed",
        }
    }
}
