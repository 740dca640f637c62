//! Session gate
//!
//! Credentials are verified elsewhere; the gate starts from a verified user
//! id. It issues a random token, stores only the token's SHA-256, and later
//! turns the token back into a [`CallerContext`]. The role is read from the
//! user record on every restore, so promotions apply without re-login.

use std::sync::Arc;

use chrono::Utc;
use meetbook_domain::constants::SESSION_TOKEN_BYTES;
use meetbook_domain::{
    stored_instant, CallerContext, Identity, MeetbookError, Result, Session, SessionToken, SignIn,
    UserId,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use super::ports::SessionRepository;
use crate::users::UserRepository;
use crate::retry::TransientRetry;

/// Lowercase hex SHA-256 of a raw token
#[must_use]
pub fn hash_token(token: &SessionToken) -> String {
    hex::encode(Sha256::digest(token.expose().as_bytes()))
}

fn generate_token() -> SessionToken {
    let mut bytes = [0_u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    SessionToken::new(hex::encode(bytes))
}

pub struct SessionGate {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    retry: TransientRetry,
}

impl SessionGate {
    pub fn new(sessions: Arc<dyn SessionRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { sessions, users, retry: TransientRetry::default() }
    }

    pub fn with_retry(mut self, retry: TransientRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Login handshake for a user the identity provider has verified.
    #[instrument(skip(self))]
    pub async fn sign_in(&self, verified_user_id: &UserId) -> Result<SignIn> {
        let user = self
            .retry
            .run("find_user", || self.users.find_by_id(verified_user_id))
            .await?
            .ok_or_else(|| MeetbookError::NotFound(format!("user {verified_user_id}")))?;

        let token = generate_token();
        let now = stored_instant(Utc::now());
        let session = Session {
            token_hash: hash_token(&token),
            user_id: user.id.clone(),
            created_at: now,
            last_seen_at: now,
        };
        self.retry.run("insert_session", || self.sessions.insert(session.clone())).await?;

        info!(user_id = %user.id, role = %user.role, "session opened");
        Ok(SignIn { token, context: CallerContext::authenticated(Identity::new(user.id, user.role)) })
    }

    /// Resolve a device token.
    ///
    /// An unknown token, or one whose user no longer exists, resolves to an
    /// anonymous context rather than an error.
    pub async fn restore(&self, token: &SessionToken) -> Result<CallerContext> {
        let token_hash = hash_token(token);

        let Some(session) =
            self.retry.run("find_session", || self.sessions.find(&token_hash)).await?
        else {
            debug!("unknown session token");
            return Ok(CallerContext::anonymous());
        };

        let Some(user) =
            self.retry.run("find_user", || self.users.find_by_id(&session.user_id)).await?
        else {
            debug!(user_id = %session.user_id, "session refers to a missing user");
            return Ok(CallerContext::anonymous());
        };

        self.retry.run("touch_session", || self.sessions.touch(&token_hash, stored_instant(Utc::now()))).await?;

        debug!(user_id = %user.id, "session restored");
        Ok(CallerContext::authenticated(Identity::new(user.id, user.role)))
    }

    /// Logout. Signing out an unknown token is not an error.
    pub async fn sign_out(&self, token: &SessionToken) -> Result<()> {
        let token_hash = hash_token(token);
        let removed = self.retry.run("delete_session", || self.sessions.delete(&token_hash)).await?;
        if removed {
            info!("session closed");
        }
        Ok(())
    }
}
