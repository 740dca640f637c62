//! Port interfaces for user profiles

use async_trait::async_trait;
use meetbook_domain::{Result, Role, User, UserId};

/// Trait for user profile persistence and retrieval
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a taken id or email yields `Validation`
    async fn insert(&self, user: User) -> Result<()>;

    /// Get user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;

    /// Get user by email (stored lowercase)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Change a user's role; `None` if the user does not exist
    async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>>;
}
