//! Registration and session commands

use meetbook_domain::{
    CallerContext, NewUser, Result as DomainResult, SessionToken, SignIn, User, UserId,
};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Create a user profile; only an anonymous caller may register.
pub async fn register_user(
    ctx: &AppContext,
    caller: &CallerContext,
    input: NewUser,
) -> DomainResult<User> {
    execute_command("accounts::register_user", ctx.registration.register(caller, input)).await
}

/// Open a session for a user the identity provider has verified.
pub async fn sign_in(ctx: &AppContext, verified_user_id: &str) -> DomainResult<SignIn> {
    execute_command("accounts::sign_in", async {
        let user_id = UserId::parse(verified_user_id)?;
        ctx.sessions.sign_in(&user_id).await
    })
    .await
}

/// Resolve a stored device token into the caller context for later commands.
pub async fn restore_session(ctx: &AppContext, token: &SessionToken) -> DomainResult<CallerContext> {
    execute_command("accounts::restore_session", ctx.sessions.restore(token)).await
}

pub async fn sign_out(ctx: &AppContext, token: &SessionToken) -> DomainResult<()> {
    execute_command("accounts::sign_out", ctx.sessions.sign_out(token)).await
}

/// Grant the admin role (admin only).
pub async fn promote_user(
    ctx: &AppContext,
    caller: &CallerContext,
    user_id: &str,
) -> DomainResult<User> {
    execute_command("accounts::promote_user", async {
        let user_id = UserId::parse(user_id)?;
        ctx.registration.promote(caller, &user_id).await
    })
    .await
}
