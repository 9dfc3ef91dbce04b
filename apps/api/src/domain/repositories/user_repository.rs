use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::user::value_objects::{Email, UserRole};

/// User data for persistence
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for User aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken email is a `Conflict`
    async fn create(&self, user: User) -> DomainResult<Uuid>;

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> DomainResult<Option<User>>;

    /// All users, newest first
    async fn list(&self) -> DomainResult<Vec<User>>;

    /// Persist profile, role and active flag
    async fn update(&self, user: &User) -> DomainResult<()>;

    async fn count_by_role(&self, role: UserRole) -> DomainResult<u64>;

    /// Update user's last login timestamp
    async fn update_last_login(&self, user_id: Uuid) -> DomainResult<()>;
}
