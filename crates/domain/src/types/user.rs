//! Registered user profiles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::role::Role;

/// User profile stored by the user repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration input
///
/// Carries no role: every registration yields [`Role::User`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Id issued by the external identity provider
    pub id: String,
    pub email: String,
    pub name: String,
    pub surname: String,
}
