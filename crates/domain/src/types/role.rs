//! Roles, resolved identities and the per-call context

use serde::{Deserialize, Serialize};

use super::ids::UserId;
use crate::impl_domain_status_conversions;

/// Role of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl_domain_status_conversions!(Role {
    Admin => "admin",
    User => "user",
});

/// An authenticated principal: who is calling and with which role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Explicit per-call context
///
/// Every service call receives one. An empty context means nobody is signed
/// in; only registration and the login handshake accept it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    identity: Option<Identity>,
}

impl CallerContext {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { identity: None }
    }

    #[must_use]
    pub const fn authenticated(identity: Identity) -> Self {
        Self { identity: Some(identity) }
    }

    /// The identity currently bound to this call, if any
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
