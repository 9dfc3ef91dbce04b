use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{LocalizedText, Slug};
use crate::domain::errors::{DomainError, DomainResult};

/// Editable product attributes, shared by create and update
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub sku: String,
    pub slug: Option<String>,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Product aggregate root
///
/// Holds catalog data together with the inventory counters used by checkout.
///
/// # Invariants
/// - Spanish name and SKU are non-empty; SKU is upper-cased
/// - Price is positive; a compare-at price must exceed it
/// - `0 <= reserved <= stock`
#[derive(Debug, Clone)]
pub struct Product {
    id: Uuid,
    sku: String,
    slug: Slug,
    name: LocalizedText,
    description: LocalizedText,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    category_id: Option<Uuid>,
    image_url: Option<String>,
    stock: i32,
    reserved: i32,
    is_active: bool,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct ValidatedDraft {
    sku: String,
    slug: Slug,
    draft: ProductDraft,
}

fn validate(draft: ProductDraft) -> DomainResult<ValidatedDraft> {
    if draft.name.is_blank() {
        return Err(DomainError::validation("Product name cannot be empty"));
    }

    let sku = draft.sku.trim().to_uppercase();
    if sku.is_empty() {
        return Err(DomainError::validation("SKU cannot be empty"));
    }

    if draft.price <= Decimal::ZERO {
        return Err(DomainError::NonPositiveAmount(draft.price));
    }

    if let Some(compare_at) = draft.compare_at_price {
        if compare_at <= draft.price {
            return Err(DomainError::validation(
                "Compare-at price must be greater than price",
            ));
        }
    }

    let slug = Slug::from_name(draft.slug.as_deref().unwrap_or(&draft.name.es))
        .map_err(DomainError::Validation)?;

    Ok(ValidatedDraft { sku, slug, draft })
}

impl Product {
    /// Creates a new product with the given initial stock
    ///
    /// # Example
    /// ```
    /// use rust_decimal::Decimal;
    /// use tienda_api::domain::catalog::{LocalizedText, Product, ProductDraft};
    ///
    /// let product = Product::new(
    ///     ProductDraft {
    ///         sku: "caf-001".to_string(),
    ///         slug: None,
    ///         name: LocalizedText::new("Café Huila", Some("Huila Coffee".to_string())),
    ///         description: LocalizedText::new("Tostión media", None),
    ///         price: Decimal::new(32000, 0),
    ///         compare_at_price: None,
    ///         category_id: None,
    ///         image_url: None,
    ///         is_active: true,
    ///         is_featured: false,
    ///     },
    ///     10,
    /// )
    /// .expect("valid product");
    ///
    /// assert_eq!(product.sku(), "CAF-001");
    /// assert_eq!(product.available(), 10);
    /// ```
    pub fn new(draft: ProductDraft, stock: i32) -> DomainResult<Self> {
        if stock < 0 {
            return Err(DomainError::validation("Stock cannot be negative"));
        }
        let ValidatedDraft { sku, slug, draft } = validate(draft)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            sku,
            slug,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            compare_at_price: draft.compare_at_price,
            category_id: draft.category_id,
            image_url: draft.image_url,
            stock,
            reserved: 0,
            is_active: draft.is_active,
            is_featured: draft.is_featured,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable attributes; inventory is untouched
    pub fn update(&mut self, draft: ProductDraft) -> DomainResult<()> {
        let ValidatedDraft { sku, slug, draft } = validate(draft)?;
        self.sku = sku;
        self.slug = slug;
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.compare_at_price = draft.compare_at_price;
        self.category_id = draft.category_id;
        self.image_url = draft.image_url;
        self.is_active = draft.is_active;
        self.is_featured = draft.is_featured;
        self.touch();
        Ok(())
    }

    /// Sets the on-hand stock. It may not drop below what is already reserved.
    pub fn set_stock(&mut self, stock: i32) -> DomainResult<()> {
        if stock < self.reserved {
            return Err(DomainError::conflict(format!(
                "Stock {} is below reserved quantity {}",
                stock, self.reserved
            )));
        }
        self.stock = stock;
        self.touch();
        Ok(())
    }

    /// Units that can still be sold
    pub fn available(&self) -> i32 {
        self.stock - self.reserved
    }

    /// Holds `quantity` units for a pending order
    pub fn reserve(&mut self, quantity: i32) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("Quantity must be positive"));
        }
        if self.available() < quantity {
            return Err(DomainError::InsufficientStock {
                sku: self.sku.clone(),
                requested: quantity,
                available: self.available(),
            });
        }
        self.reserved += quantity;
        self.touch();
        Ok(())
    }

    /// Returns previously reserved units to the sellable pool
    pub fn release(&mut self, quantity: i32) {
        self.reserved = (self.reserved - quantity).max(0);
        self.touch();
    }

    /// Converts a reservation into a sale
    pub fn commit(&mut self, quantity: i32) {
        self.stock = (self.stock - quantity).max(0);
        self.reserved = (self.reserved - quantity).max(0);
        self.touch();
    }

    /// Puts sold units back on the shelf
    pub fn restock(&mut self, quantity: i32) {
        self.stock += quantity.max(0);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn name(&self) -> &LocalizedText {
        &self.name
    }

    pub fn description(&self) -> &LocalizedText {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn compare_at_price(&self) -> Option<Decimal> {
        self.compare_at_price
    }

    pub fn category_id(&self) -> Option<Uuid> {
        self.category_id
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn stock(&self) -> i32 {
        self.stock
    }

    pub fn reserved(&self) -> i32 {
        self.reserved
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reconstructs a Product from persistence layer data
    ///
    /// Only to be used by repository implementations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        sku: String,
        slug: Slug,
        name: LocalizedText,
        description: LocalizedText,
        price: Decimal,
        compare_at_price: Option<Decimal>,
        category_id: Option<Uuid>,
        image_url: Option<String>,
        stock: i32,
        reserved: i32,
        is_active: bool,
        is_featured: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sku,
            slug,
            name,
            description,
            price,
            compare_at_price,
            category_id,
            image_url,
            stock,
            reserved,
            is_active,
            is_featured,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            sku: " bol-010 ".to_string(),
            slug: None,
            name: LocalizedText::new("Bolso Wayuu", Some("Wayuu Bag".to_string())),
            description: LocalizedText::new("Tejido a mano", Some("Handwoven".to_string())),
            price: Decimal::new(150000, 0),
            compare_at_price: Some(Decimal::new(180000, 0)),
            category_id: None,
            image_url: None,
            is_active: true,
            is_featured: true,
        }
    }

    #[test]
    fn create_product_normalizes_sku_and_slug() {
        let product = Product::new(draft(), 4).unwrap();
        assert_eq!(product.sku(), "BOL-010");
        assert_eq!(product.slug().as_str(), "bolso-wayuu");
        assert_eq!(product.available(), 4);
        assert_eq!(product.reserved(), 0);
    }

    #[test]
    fn zero_price_rejected() {
        let mut data = draft();
        data.price = Decimal::ZERO;
        assert!(matches!(
            Product::new(data, 1),
            Err(DomainError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn compare_at_price_must_exceed_price() {
        let mut data = draft();
        data.compare_at_price = Some(Decimal::new(150000, 0));
        assert!(Product::new(data, 1).is_err());
    }

    #[test]
    fn negative_stock_rejected() {
        assert!(Product::new(draft(), -1).is_err());
    }

    #[test]
    fn reserve_reduces_availability() {
        let mut product = Product::new(draft(), 5).unwrap();
        product.reserve(3).unwrap();
        assert_eq!(product.available(), 2);
        assert_eq!(product.stock(), 5);
    }

    #[test]
    fn reserve_beyond_availability_fails() {
        let mut product = Product::new(draft(), 2).unwrap();
        let err = product.reserve(3).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("Expected InsufficientStock, got {:?}", other),
        }
        assert_eq!(product.reserved(), 0);
    }

    #[test]
    fn release_and_commit() {
        let mut product = Product::new(draft(), 10).unwrap();
        product.reserve(4).unwrap();
        product.release(1);
        assert_eq!(product.reserved(), 3);

        product.commit(3);
        assert_eq!(product.stock(), 7);
        assert_eq!(product.reserved(), 0);
        assert_eq!(product.available(), 7);
    }

    #[test]
    fn release_never_goes_negative() {
        let mut product = Product::new(draft(), 10).unwrap();
        product.release(5);
        assert_eq!(product.reserved(), 0);
    }

    #[test]
    fn set_stock_below_reserved_fails() {
        let mut product = Product::new(draft(), 10).unwrap();
        product.reserve(6).unwrap();
        assert!(product.set_stock(5).is_err());
        assert!(product.set_stock(6).is_ok());
        assert_eq!(product.available(), 0);
    }

    #[test]
    fn update_keeps_inventory() {
        let mut product = Product::new(draft(), 10).unwrap();
        product.reserve(2).unwrap();
        let mut data = draft();
        data.name = LocalizedText::new("Mochila Wayuu", None);
        data.price = Decimal::new(120000, 0);
        data.compare_at_price = None;
        product.update(data).unwrap();

        assert_eq!(product.slug().as_str(), "mochila-wayuu");
        assert_eq!(product.price(), Decimal::new(120000, 0));
        assert_eq!(product.reserved(), 2);
        assert_eq!(product.stock(), 10);
    }
}
