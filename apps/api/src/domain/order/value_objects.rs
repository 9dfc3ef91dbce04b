use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order
///
/// # Status Transitions
/// ```text
/// Pending -> Paid -> Processing -> Shipped -> Delivered
///    |        |
///    +--------+--> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, inventory reserved, awaiting payment
    Pending,
    /// Payment approved, inventory committed
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use tienda_api::domain::order::value_objects::OrderStatus;
    ///
    /// assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
    /// assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    /// ```
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Processing)
                | (Paid, Cancelled)
                | (Processing, Shipped)
                | (Shipped, Delivered)
        )
    }

    /// Statuses whose totals count as collected revenue
    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn happy_path_transitions() {
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn cancellation_only_before_processing() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Paid.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in [Pending, Paid, Processing, Shipped, Delivered, Cancelled] {
            assert!(!Cancelled.can_transition_to(next));
            assert!(!Delivered.can_transition_to(next));
        }
    }

    #[test]
    fn revenue_statuses() {
        assert!(!Pending.is_paid());
        assert!(Paid.is_paid());
        assert!(Delivered.is_paid());
        assert!(!Cancelled.is_paid());
    }

    #[test]
    fn status_display() {
        assert_eq!(Pending.to_string(), "pending");
        assert_eq!(Cancelled.to_string(), "cancelled");
    }
}
