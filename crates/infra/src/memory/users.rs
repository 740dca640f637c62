//! User storage behind a single read-write lock
//!
//! Id and email uniqueness are checked and claimed under one write lock.

use std::collections::HashMap;

use async_trait::async_trait;
use meetbook_core::users::ports::UserRepository;
use meetbook_domain::{MeetbookError, Result, Role, User, UserId};
use parking_lot::RwLock;

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    /// lowercase email -> id
    by_email: HashMap<String, UserId>,
}

#[derive(Default)]
pub struct MemoryUserRepository {
    table: RwLock<UserTable>,
}

impl MemoryUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: User) -> Result<()> {
        let email = user.email.to_lowercase();
        let mut table = self.table.write();

        if table.by_id.contains_key(&user.id) || table.by_email.contains_key(&email) {
            return Err(MeetbookError::Validation(format!(
                "user id {} or email {} is already registered",
                user.id, user.email
            )));
        }

        table.by_email.insert(email, user.id.clone());
        table.by_id.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.table.read().by_id.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let table = self.table.read();
        let user = table
            .by_email
            .get(&email.trim().to_lowercase())
            .and_then(|id| table.by_id.get(id))
            .cloned();
        Ok(user)
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<Option<User>> {
        let mut table = self.table.write();
        Ok(table.by_id.get_mut(id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}
