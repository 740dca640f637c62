//! Service wiring and identities for tests.

use std::sync::Arc;

use chrono::Utc;
use meetbook_core::{
    CalendarIndex, MeetingRepository, MeetingService, RegistrationService, ReservationCoordinator,
    SessionGate, TransientRetry,
};
use meetbook_domain::{
    CallerContext, Identity, NewMeeting, ReservationConfig, Role, User, UserId,
};

use super::repositories::{MockMeetingRepository, MockSessionRepository, MockUserRepository};

pub fn admin() -> CallerContext {
    CallerContext::authenticated(Identity::new(UserId::new("admin-1"), Role::Admin))
}

pub fn member(id: &str) -> CallerContext {
    CallerContext::authenticated(Identity::new(UserId::new(id), Role::User))
}

pub fn standup(capacity: i64) -> NewMeeting {
    NewMeeting {
        name: "Standup".to_string(),
        scheduled_at: "2024-03-10T09:00".to_string(),
        capacity,
    }
}

pub fn meeting_at(name: &str, scheduled_at: &str) -> NewMeeting {
    NewMeeting { name: name.to_string(), scheduled_at: scheduled_at.to_string(), capacity: 5 }
}

pub fn user(id: &str, email: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        email: email.to_string(),
        name: "Test".to_string(),
        surname: "User".to_string(),
        role,
        created_at: Utc::now(),
    }
}

/// Fast retries so transient-path tests stay quick.
pub fn quick_retry(retries: u32) -> TransientRetry {
    TransientRetry::from_config(&ReservationConfig {
        max_transient_retries: retries,
        retry_base_delay_ms: 1,
        max_cas_attempts: 8,
    })
}

/// Meeting-side services over one repository.
pub struct Engine {
    pub calendar: Arc<CalendarIndex>,
    pub meetings: MeetingService,
    pub reservations: Arc<ReservationCoordinator>,
}

impl Engine {
    pub fn over(repository: Arc<dyn MeetingRepository>) -> Self {
        let retry = quick_retry(3);
        let calendar =
            Arc::new(CalendarIndex::new(Arc::clone(&repository), "blue").with_retry(retry.clone()));
        let meetings =
            MeetingService::new(Arc::clone(&repository), Arc::clone(&calendar)).with_retry(retry.clone());
        let reservations = Arc::new(ReservationCoordinator::new(repository).with_retry(retry));
        Self { calendar, meetings, reservations }
    }

    pub fn in_memory() -> (Self, MockMeetingRepository) {
        let repository = MockMeetingRepository::new();
        (Self::over(Arc::new(repository.clone())), repository)
    }
}

/// User-side services over mock repositories.
pub struct Accounts {
    pub users: MockUserRepository,
    pub sessions: MockSessionRepository,
    pub registration: RegistrationService,
    pub gate: SessionGate,
}

impl Accounts {
    pub fn in_memory() -> Self {
        let users = MockUserRepository::new();
        let sessions = MockSessionRepository::new();
        let registration =
            RegistrationService::new(Arc::new(users.clone())).with_retry(quick_retry(1));
        let gate = SessionGate::new(Arc::new(sessions.clone()), Arc::new(users.clone()))
            .with_retry(quick_retry(1));
        Self { users, sessions, registration, gate }
    }
}
