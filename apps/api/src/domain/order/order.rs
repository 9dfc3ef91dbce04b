use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::OrderEvent;
use super::pricing::{compute_totals, PricingRules, Totals};
use super::value_objects::OrderStatus;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::payment::PaymentMethod;
use crate::domain::user::Address;

/// Line of an order, priced at placement time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl OrderItem {
    pub fn new(
        product_id: Uuid,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: i32,
    ) -> Self {
        Self {
            product_id,
            sku: sku.into(),
            name: name.into(),
            unit_price,
            quantity,
            line_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// Copy of the delivery address taken when the order is placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub department: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            recipient: address.recipient.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            city: address.city.clone(),
            department: address.department.clone(),
            postal_code: address.postal_code.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Order aggregate root
///
/// # Invariants
/// - At least one item, every quantity positive
/// - Totals are derived from the items and the pricing rules at placement
/// - Status changes follow `OrderStatus::can_transition_to`
#[derive(Debug, Clone)]
pub struct Order {
    id: Uuid,
    reference: String,
    user_id: Uuid,
    items: Vec<OrderItem>,
    totals: Totals,
    currency: String,
    shipping_address: ShippingAddress,
    status: OrderStatus,
    payment_method: Option<PaymentMethod>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Places a new order in `Pending` status
    pub fn place(
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        notes: Option<String>,
        rules: &PricingRules,
    ) -> DomainResult<(Self, OrderEvent)> {
        if items.is_empty() {
            return Err(DomainError::validation("Order must contain at least one item"));
        }
        if let Some(item) = items.iter().find(|i| i.quantity <= 0) {
            return Err(DomainError::validation(format!(
                "Invalid quantity {} for {}",
                item.quantity, item.sku
            )));
        }

        let totals = compute_totals(items.iter().map(|i| (i.unit_price, i.quantity)), rules);
        let id = Uuid::new_v4();
        let now = Utc::now();
        let order = Self {
            id,
            reference: Self::reference_for(id, now),
            user_id,
            items,
            totals,
            currency: rules.currency.clone(),
            shipping_address,
            status: OrderStatus::Pending,
            payment_method: None,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let event = OrderEvent::Placed {
            order_id: order.id,
            user_id,
            reference: order.reference.clone(),
            total: order.totals.total,
        };

        Ok((order, event))
    }

    /// Human-facing reference: `ORD-YYYYMMDD-XXXXXXXX`
    pub fn reference_for(id: Uuid, at: DateTime<Utc>) -> String {
        let simple = id.simple().to_string().to_uppercase();
        format!("ORD-{}-{}", at.format("%Y%m%d"), &simple[..8])
    }

    /// Moves the order to `next`, enforcing the transition table
    pub fn transition_to(&mut self, next: OrderStatus) -> DomainResult<OrderEvent> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        let from = self.status;
        self.status = next;
        self.updated_at = Utc::now();

        Ok(OrderEvent::StatusChanged {
            order_id: self.id,
            from,
            to: next,
        })
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
        self.updated_at = Utc::now();
    }

    /// `(product_id, quantity)` pairs, the shape inventory operations take
    pub fn quantities(&self) -> Vec<(Uuid, i32)> {
        self.items.iter().map(|i| (i.product_id, i.quantity)).collect()
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn total(&self) -> Decimal {
        self.totals.total
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs an Order from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        reference: String,
        user_id: Uuid,
        items: Vec<OrderItem>,
        totals: Totals,
        currency: String,
        shipping_address: ShippingAddress,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reference,
            user_id,
            items,
            totals,
            currency,
            shipping_address,
            status,
            payment_method,
            notes,
            created_at,
            updated_at,
        }
    }
}
