//! Role-based operation gate
//!
//! The table is static: every [`Operation`] maps to exactly one
//! [`Requirement`]. Services call [`AccessPolicy::require`] before touching
//! storage, so a denied call never has side effects.

use meetbook_domain::{impl_domain_status_conversions, CallerContext, Identity, MeetbookError, Result};
use tracing::warn;

/// Operations exposed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateMeeting,
    DeleteMeeting,
    RenameMeeting,
    AddAttendee,
    RemoveAttendee,
    PromoteUser,
    Join,
    Leave,
    ListByDay,
    GetMeeting,
    ListAll,
    ViewCalendar,
    ReservationStatus,
    Logout,
    Register,
    Login,
}

impl_domain_status_conversions!(Operation {
    CreateMeeting => "create_meeting",
    DeleteMeeting => "delete_meeting",
    RenameMeeting => "rename_meeting",
    AddAttendee => "add_attendee",
    RemoveAttendee => "remove_attendee",
    PromoteUser => "promote_user",
    Join => "join",
    Leave => "leave",
    ListByDay => "list_by_day",
    GetMeeting => "get_meeting",
    ListAll => "list_all",
    ViewCalendar => "view_calendar",
    ReservationStatus => "reservation_status",
    Logout => "logout",
    Register => "register",
    Login => "login",
});

/// What a caller must be to run an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Nobody may be signed in
    Anonymous,
    /// Any signed-in identity
    Authenticated,
    Admin,
    /// No restriction
    Anyone,
}

impl Operation {
    #[must_use]
    pub const fn requirement(self) -> Requirement {
        match self {
            Self::CreateMeeting
            | Self::DeleteMeeting
            | Self::RenameMeeting
            | Self::AddAttendee
            | Self::RemoveAttendee
            | Self::PromoteUser => Requirement::Admin,
            Self::Join
            | Self::Leave
            | Self::ListByDay
            | Self::GetMeeting
            | Self::ListAll
            | Self::ViewCalendar
            | Self::ReservationStatus
            | Self::Logout => Requirement::Authenticated,
            Self::Register => Requirement::Anonymous,
            Self::Login => Requirement::Anyone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

/// Stateless policy evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluate the table for a (possibly absent) identity.
    #[must_use]
    pub fn authorize(&self, identity: Option<&Identity>, operation: Operation) -> Decision {
        let allowed = match operation.requirement() {
            Requirement::Anyone => true,
            Requirement::Anonymous => identity.is_none(),
            Requirement::Authenticated => identity.is_some(),
            Requirement::Admin => identity.is_some_and(Identity::is_admin),
        };

        if allowed {
            Decision::Allowed
        } else {
            Decision::Denied
        }
    }

    /// Gate an operation that acts on behalf of a signed-in identity and
    /// hand that identity back.
    pub fn require<'a>(&self, ctx: &'a CallerContext, operation: Operation) -> Result<&'a Identity> {
        self.check(ctx, operation)?;
        ctx.identity().ok_or_else(|| {
            MeetbookError::Forbidden(format!("{operation} requires a signed-in identity"))
        })
    }

    /// Gate an operation that only anonymous callers may run.
    pub fn require_anonymous(&self, ctx: &CallerContext, operation: Operation) -> Result<()> {
        self.check(ctx, operation)
    }

    fn check(&self, ctx: &CallerContext, operation: Operation) -> Result<()> {
        match self.authorize(ctx.identity(), operation) {
            Decision::Allowed => Ok(()),
            Decision::Denied => {
                let caller = ctx.identity().map(|identity| identity.user_id.to_string());
                warn!(
                    operation = %operation,
                    user_id = caller.as_deref().unwrap_or("anonymous"),
                    "access denied"
                );
                Err(denial(ctx.identity(), operation))
            }
        }
    }
}

fn denial(identity: Option<&Identity>, operation: Operation) -> MeetbookError {
    let reason = match (operation.requirement(), identity) {
        (Requirement::Admin, _) => "admin role required",
        (Requirement::Anonymous, Some(_)) => "already signed in",
        _ => "sign in required",
    };
    MeetbookError::Forbidden(format!("{operation}: {reason}"))
}

#[cfg(test)]
mod tests {
    use meetbook_domain::{Role, UserId};

    use super::*;

    fn identity(role: Role) -> Identity {
        Identity::new(UserId::new("u-1"), role)
    }

    const ADMIN_ONLY: [Operation; 6] = [
        Operation::CreateMeeting,
        Operation::DeleteMeeting,
        Operation::RenameMeeting,
        Operation::AddAttendee,
        Operation::RemoveAttendee,
        Operation::PromoteUser,
    ];

    const SIGNED_IN: [Operation; 8] = [
        Operation::Join,
        Operation::Leave,
        Operation::ListByDay,
        Operation::GetMeeting,
        Operation::ListAll,
        Operation::ViewCalendar,
        Operation::ReservationStatus,
        Operation::Logout,
    ];

    #[test]
    fn admin_operations_reject_users_and_anonymous() {
        let policy = AccessPolicy::new();
        let user = identity(Role::User);
        let admin = identity(Role::Admin);

        for op in ADMIN_ONLY {
            assert_eq!(policy.authorize(Some(&admin), op), Decision::Allowed, "{op}");
            assert_eq!(policy.authorize(Some(&user), op), Decision::Denied, "{op}");
            assert_eq!(policy.authorize(None, op), Decision::Denied, "{op}");
        }
    }

    #[test]
    fn signed_in_operations_accept_any_role() {
        let policy = AccessPolicy::new();
        for op in SIGNED_IN {
            assert_eq!(policy.authorize(Some(&identity(Role::User)), op), Decision::Allowed);
            assert_eq!(policy.authorize(Some(&identity(Role::Admin)), op), Decision::Allowed);
            assert_eq!(policy.authorize(None, op), Decision::Denied, "{op}");
        }
    }

    #[test]
    fn register_is_anonymous_only_and_login_is_open() {
        let policy = AccessPolicy::new();
        assert_eq!(policy.authorize(None, Operation::Register), Decision::Allowed);
        assert_eq!(
            policy.authorize(Some(&identity(Role::User)), Operation::Register),
            Decision::Denied
        );
        assert_eq!(policy.authorize(None, Operation::Login), Decision::Allowed);
        assert_eq!(
            policy.authorize(Some(&identity(Role::Admin)), Operation::Login),
            Decision::Allowed
        );
    }

    #[test]
    fn require_surfaces_forbidden() {
        let policy = AccessPolicy::new();
        let ctx = CallerContext::authenticated(identity(Role::User));

        let err = policy.require(&ctx, Operation::CreateMeeting).unwrap_err();
        assert!(matches!(err, MeetbookError::Forbidden(ref msg) if msg.contains("admin")));

        let granted = policy.require(&ctx, Operation::Join).unwrap();
        assert_eq!(granted.user_id.as_str(), "u-1");

        let err = policy.require(&CallerContext::anonymous(), Operation::Join).unwrap_err();
        assert_eq!(err.label(), "forbidden");
    }

    #[test]
    fn require_anonymous_rejects_signed_in_callers() {
        let policy = AccessPolicy::new();
        assert!(policy.require_anonymous(&CallerContext::anonymous(), Operation::Register).is_ok());
        let ctx = CallerContext::authenticated(identity(Role::User));
        assert!(policy.require_anonymous(&ctx, Operation::Register).is_err());
    }
}
