// Catalog domain module
// Categories, products, localization and catalog queries

pub mod category;
pub mod product;
pub mod value_objects;

pub use category::Category;
pub use product::{Product, ProductDraft};
pub use value_objects::{Locale, LocalizedText, Slug};

use rust_decimal::Decimal;
use serde::Serialize;

/// Largest page size a catalog query may request
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Product listing criteria
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_slug: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub featured: Option<bool>,
    pub include_inactive: bool,
    pub page: u32,
    pub per_page: u32,
}

impl ProductFilter {
    /// Clamps paging values into their valid ranges
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = match self.per_page {
            0 => DEFAULT_PER_PAGE,
            n => n.min(MAX_PER_PAGE),
        };
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)) * self.per_page
    }

    /// In-memory evaluation of the price, search, featured and visibility criteria
    ///
    /// The category criterion is resolved by the caller because it needs the slug lookup.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active() {
            return false;
        }
        if let Some(min) = self.min_price {
            if product.price() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price() > max {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured() != featured {
                return false;
            }
        }
        match &self.search {
            Some(search) => product.name().contains_ignore_case(search),
            None => true,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
