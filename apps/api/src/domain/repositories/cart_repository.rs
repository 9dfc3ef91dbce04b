use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::errors::DomainResult;

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart, or an empty one if none was saved
    async fn get(&self, user_id: Uuid) -> DomainResult<Cart>;

    /// Replace the stored cart lines
    async fn save(&self, cart: &Cart) -> DomainResult<()>;
}
