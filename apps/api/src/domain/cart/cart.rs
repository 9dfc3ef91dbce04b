use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Upper bound on units of a single product in one cart
pub const MAX_LINE_QUANTITY: i32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Shopping cart aggregate, one per user
///
/// Stores only product references and quantities; prices are read from the
/// catalog whenever the cart is viewed or checked out.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    user_id: Uuid,
    items: Vec<CartItem>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn from_persistence(user_id: Uuid, items: Vec<CartItem>, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items,
            updated_at,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, product_id: Uuid) -> i32 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Adds units of a product, merging with an existing line
    ///
    /// Returns the resulting line quantity.
    pub fn add_item(&mut self, product_id: Uuid, quantity: i32) -> DomainResult<i32> {
        Self::check_line_limit(quantity)?;
        let total = self
            .quantity_of(product_id)
            .checked_add(quantity)
            .ok_or_else(Self::over_limit)?;
        Self::check_line_limit(total)?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(existing) => existing.quantity = total,
            None => self.items.push(CartItem {
                product_id,
                quantity,
            }),
        }
        self.touch();
        Ok(total)
    }

    /// Sets a line's quantity; zero removes the line
    pub fn update_quantity(&mut self, product_id: Uuid, quantity: i32) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::validation("Quantity cannot be negative"));
        }
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        Self::check_line_limit(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| DomainError::not_found("Cart item", product_id))?;
        item.quantity = quantity;
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: Uuid) -> DomainResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(DomainError::not_found("Cart item", product_id));
        }
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    fn check_line_limit(quantity: i32) -> DomainResult<()> {
        if quantity < 1 {
            return Err(DomainError::validation("Quantity must be at least 1"));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(Self::over_limit());
        }
        Ok(())
    }

    fn over_limit() -> DomainError {
        DomainError::validation(format!("At most {} units per product", MAX_LINE_QUANTITY))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_same_product() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        cart.add_item(product, 2).unwrap();
        let total = cart.add_item(product, 1).unwrap();

        assert_eq!(total, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(product), 3);
    }

    #[test]
    fn add_zero_quantity_rejected() {
        let mut cart = Cart::new(Uuid::new_v4());
        assert!(cart.add_item(Uuid::new_v4(), 0).is_err());
    }

    #[test]
    fn line_limit_enforced() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        cart.add_item(product, 98).unwrap();
        assert!(cart.add_item(product, 2).is_err());
        assert_eq!(cart.quantity_of(product), 98);
    }

    #[test]
    fn line_limit_boundary() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        assert_eq!(cart.add_item(product, MAX_LINE_QUANTITY).unwrap(), MAX_LINE_QUANTITY);
        assert!(matches!(cart.add_item(product, 1), Err(DomainError::Validation(_))));
        assert!(cart.update_quantity(product, MAX_LINE_QUANTITY + 1).is_err());
        assert_eq!(cart.quantity_of(product), MAX_LINE_QUANTITY);
    }

    #[test]
    fn huge_quantity_does_not_overflow() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        cart.add_item(product, 1).unwrap();

        assert!(matches!(cart.add_item(product, i32::MAX), Err(DomainError::Validation(_))));
        assert_eq!(cart.quantity_of(product), 1);
    }

    #[test]
    fn negative_quantities_rejected() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        assert!(cart.add_item(product, -5).is_err());
        cart.add_item(product, 2).unwrap();
        assert!(cart.update_quantity(product, -1).is_err());
        assert!(cart.update_quantity(product, i32::MIN).is_err());
        assert_eq!(cart.quantity_of(product), 2);
    }

    #[test]
    fn update_to_zero_removes_line() {
        let mut cart = Cart::new(Uuid::new_v4());
        let product = Uuid::new_v4();
        cart.add_item(product, 2).unwrap();
        cart.update_quantity(product, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn update_missing_line_fails() {
        let mut cart = Cart::new(Uuid::new_v4());
        assert!(matches!(
            cart.update_quantity(Uuid::new_v4(), 3),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new(Uuid::new_v4());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cart.add_item(a, 1).unwrap();
        cart.add_item(b, 1).unwrap();

        cart.remove_item(a).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert!(cart.remove_item(a).is_err());

        cart.clear();
        assert!(cart.is_empty());
    }
}
