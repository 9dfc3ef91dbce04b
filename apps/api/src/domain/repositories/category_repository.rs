use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::{Category, Slug};
use crate::domain::errors::DomainResult;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by Spanish name
    async fn list(&self) -> DomainResult<Vec<Category>>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &Slug) -> DomainResult<Option<Category>>;

    /// Insert a category; a taken slug is a `Conflict`
    async fn create(&self, category: &Category) -> DomainResult<()>;

    async fn update(&self, category: &Category) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
