//! Application context - dependency injection container

use std::sync::Arc;

use meetbook_core::{
    CalendarIndex, MeetingService, RegistrationService, ReservationCoordinator, SessionGate,
    TransientRetry,
};
use meetbook_domain::{Config, MeetbookError, Result};
use meetbook_infra::Storage;
use tracing::{info, warn};

/// Application context - holds all services and dependencies
///
/// One per process. Commands borrow it; nothing in here is global.
pub struct AppContext {
    pub config: Config,
    pub storage: Storage,
    pub calendar: Arc<CalendarIndex>,
    pub meetings: MeetingService,
    pub reservations: ReservationCoordinator,
    pub registration: RegistrationService,
    pub sessions: SessionGate,
}

impl AppContext {
    /// Create a context from the loaded configuration (env, file, defaults).
    pub async fn new() -> Result<Self> {
        let config = meetbook_infra::config::load()?;
        Self::new_with_config(config).await
    }

    /// Create a context with an explicit configuration.
    ///
    /// Tests use this to point at a temporary database or the memory backend.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = Storage::open(&config)?;
        Self::with_storage(config, storage).await
    }

    /// Wire services over already opened storage.
    pub async fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let retry = TransientRetry::from_config(&config.reservations);

        let calendar = Arc::new(
            CalendarIndex::new(Arc::clone(&storage.meetings), config.calendar.marker_color.clone())
                .with_retry(retry.clone()),
        );
        let meetings = MeetingService::new(Arc::clone(&storage.meetings), Arc::clone(&calendar))
            .with_retry(retry.clone());
        let reservations =
            ReservationCoordinator::new(Arc::clone(&storage.meetings)).with_retry(retry.clone());
        let registration =
            RegistrationService::new(Arc::clone(&storage.users)).with_retry(retry.clone());
        let sessions = SessionGate::new(Arc::clone(&storage.sessions), Arc::clone(&storage.users))
            .with_retry(retry);

        let ctx = Self { config, storage, calendar, meetings, reservations, registration, sessions };
        ctx.bootstrap_admins().await?;

        info!(
            backend = %ctx.storage.backend(),
            admin_emails = ctx.config.access.admin_emails.len(),
            "application context ready"
        );
        Ok(ctx)
    }

    /// Promote registered users listed in `access.admin_emails`.
    ///
    /// Emails with no registered user yet are skipped; they are picked up on
    /// a later start.
    pub async fn bootstrap_admins(&self) -> Result<usize> {
        let mut promoted = 0;
        for email in &self.config.access.admin_emails {
            match self.registration.promote_by_email(email).await {
                Ok(_) => promoted += 1,
                Err(MeetbookError::NotFound(_)) => {
                    warn!(email = %email, "configured admin email has no registered user yet");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(promoted)
    }

    /// Storage health, for the operator CLI.
    pub fn health_check(&self) -> Result<()> {
        self.storage.health_check()
    }
}
