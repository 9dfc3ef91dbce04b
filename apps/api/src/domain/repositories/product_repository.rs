use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::{Page, Product, ProductFilter, Slug};
use crate::domain::errors::DomainResult;

/// `(product_id, quantity)` pairs for inventory operations
pub type StockLines = [(Uuid, i32)];

/// Repository trait for the Product aggregate and its inventory counters
///
/// Inventory methods operate on the stored counters directly instead of
/// read-modify-write through `update`, so concurrent checkouts cannot
/// oversell.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product; a taken SKU or slug is a `Conflict`
    async fn create(&self, product: &Product) -> DomainResult<()>;

    /// Persist editable attributes; `stock` and `reserved` are not written
    async fn update(&self, product: &Product) -> DomainResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Product>>;

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Product>>;

    /// Products with the given ids, in no particular order; unknown ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> DomainResult<Vec<Product>>;

    /// Filtered page of products, newest first. `category_id` is the resolved
    /// `filter.category_slug`.
    async fn list(&self, filter: &ProductFilter, category_id: Option<Uuid>) -> DomainResult<Page<Product>>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;

    async fn count_in_category(&self, category_id: Uuid) -> DomainResult<u64>;

    /// Active products whose available units are at or below `threshold`
    async fn low_stock(&self, threshold: i32) -> DomainResult<Vec<Product>>;

    /// Set on-hand stock; fails with `Conflict` when below the reserved quantity
    async fn set_stock(&self, id: Uuid, stock: i32) -> DomainResult<Product>;

    /// Reserve every line or none; `InsufficientStock` names the first short line
    async fn reserve(&self, lines: &StockLines) -> DomainResult<()>;

    /// Undo a reservation
    async fn release(&self, lines: &StockLines) -> DomainResult<()>;

    /// Turn a reservation into a sale: stock and reserved both decrease
    async fn commit(&self, lines: &StockLines) -> DomainResult<()>;

    /// Put sold units back into stock
    async fn restock(&self, lines: &StockLines) -> DomainResult<()>;
}
