use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::user::Address;

#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Addresses of a user, default first
    async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Address>>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Address>>;

    /// Insert an address; a new default clears the user's previous default
    async fn create(&self, address: &Address) -> DomainResult<()>;

    /// Delete an address owned by `user_id`; `NotFound` otherwise
    async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()>;
}
