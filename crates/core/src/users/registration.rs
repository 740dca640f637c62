//! Registration service
//!
//! Registration always yields `Role::User`. The only ways to become admin are
//! an admin promoting someone, or the operator promoting by email.

use std::sync::Arc;

use chrono::Utc;
use meetbook_common::{check_field, EmailValidator, StringValidator};
use meetbook_domain::constants::{MAX_EMAIL_LENGTH, MAX_PERSON_NAME_LENGTH};
use meetbook_domain::{
    stored_instant, CallerContext, MeetbookError, NewUser, Result, Role, User, UserId,
};
use tracing::{info, instrument};

use super::ports::UserRepository;
use crate::access::{AccessPolicy, Operation};
use crate::retry::TransientRetry;

pub struct RegistrationService {
    users: Arc<dyn UserRepository>,
    policy: AccessPolicy,
    retry: TransientRetry,
}

impl RegistrationService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users, policy: AccessPolicy::new(), retry: TransientRetry::default() }
    }

    pub fn with_retry(mut self, retry: TransientRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Register a new user. Only callers without an identity may register.
    #[instrument(skip(self, ctx, new_user), fields(user_id = %new_user.id))]
    pub async fn register(&self, ctx: &CallerContext, new_user: NewUser) -> Result<User> {
        self.policy.require_anonymous(ctx, Operation::Register)?;

        let id = UserId::parse(&new_user.id)?;
        let email = normalize_email(&new_user.email)?;
        let name = validate_person_name("name", &new_user.name)?;
        let surname = validate_person_name("surname", &new_user.surname)?;

        if self.retry.run("find_user", || self.users.find_by_id(&id)).await?.is_some() {
            return Err(MeetbookError::Validation(format!("user {id} is already registered")));
        }
        if self.retry.run("find_user_by_email", || self.users.find_by_email(&email)).await?.is_some()
        {
            return Err(MeetbookError::Validation("email is already registered".to_string()));
        }

        let user = User {
            id,
            email,
            name,
            surname,
            role: Role::User,
            created_at: stored_instant(Utc::now()),
        };
        self.retry.run("insert_user", || self.users.insert(user.clone())).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Grant the admin role. Admin only.
    #[instrument(skip(self, ctx))]
    pub async fn promote(&self, ctx: &CallerContext, user_id: &UserId) -> Result<User> {
        let admin = self.policy.require(ctx, Operation::PromoteUser)?;
        let user = self.set_admin(user_id).await?;
        info!(user_id = %user.id, promoted_by = %admin.user_id, "user promoted to admin");
        Ok(user)
    }

    /// Operator path used by the CLI and the `access.admin_emails`
    /// bootstrap. Not reachable from the command layer.
    #[instrument(skip(self))]
    pub async fn promote_by_email(&self, email: &str) -> Result<User> {
        let email = normalize_email(email)?;
        let user = self
            .retry
            .run("find_user_by_email", || self.users.find_by_email(&email))
            .await?
            .ok_or_else(|| MeetbookError::NotFound(format!("user with email {email}")))?;

        if user.role == Role::Admin {
            return Ok(user);
        }

        let user = self.set_admin(&user.id).await?;
        info!(user_id = %user.id, "user promoted to admin by operator");
        Ok(user)
    }

    /// Look up a registered user.
    pub async fn find(&self, user_id: &UserId) -> Result<Option<User>> {
        self.retry.run("find_user", || self.users.find_by_id(user_id)).await
    }

    async fn set_admin(&self, user_id: &UserId) -> Result<User> {
        self.retry
            .run("set_user_role", || self.users.set_role(user_id, Role::Admin))
            .await?
            .ok_or_else(|| MeetbookError::NotFound(format!("user {user_id}")))
    }
}

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    check_field("email", &EmailValidator::new(), email.as_str()).map_err(MeetbookError::Validation)?;
    check_field("email", &StringValidator::new().max_length(MAX_EMAIL_LENGTH), email.as_str())
        .map_err(MeetbookError::Validation)?;
    Ok(email)
}

fn validate_person_name(field: &str, raw: &str) -> Result<String> {
    let validator = StringValidator::new().not_empty().max_length(MAX_PERSON_NAME_LENGTH);
    check_field(field, &validator, raw).map_err(MeetbookError::Validation)?;
    Ok(raw.trim().to_string())
}
