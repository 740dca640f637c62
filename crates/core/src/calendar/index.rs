//! Calendar index over the meeting store
//!
//! The index keeps one projection of [`project_markers`] in memory. Each
//! rebuild draws a ticket before reading the store; a finished rebuild only
//! replaces the projection if its ticket is newer than the one that produced
//! it, so a slow rebuild cannot clobber a fresher one.
//!
//! A failed rebuild is remembered. The next [`CalendarIndex::markers`] call
//! sees the index as stale and rebuilds before answering.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use meetbook_domain::{project_markers, CalendarMarkers, CallerContext, Meeting, MeetbookError, Result};
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::access::{AccessPolicy, Operation};
use crate::meetings::service::meetings_on_day;
use crate::meetings::MeetingRepository;
use crate::retry::TransientRetry;

#[derive(Debug, Default)]
struct IndexState {
    /// Ticket of the rebuild that produced `markers` (0 = never built)
    generation: u64,
    /// Highest ticket whose rebuild failed
    failed: u64,
    markers: CalendarMarkers,
}

impl IndexState {
    const fn is_stale(&self) -> bool {
        self.generation == 0 || self.failed > self.generation
    }
}

/// Derived day → marker view of the meeting store
pub struct CalendarIndex {
    repository: Arc<dyn MeetingRepository>,
    policy: AccessPolicy,
    retry: TransientRetry,
    dot_color: String,
    tickets: AtomicU64,
    state: RwLock<IndexState>,
}

impl CalendarIndex {
    pub fn new(repository: Arc<dyn MeetingRepository>, dot_color: impl Into<String>) -> Self {
        Self {
            repository,
            policy: AccessPolicy::new(),
            retry: TransientRetry::default(),
            dot_color: dot_color.into(),
            tickets: AtomicU64::new(0),
            state: RwLock::new(IndexState::default()),
        }
    }

    pub fn with_retry(mut self, retry: TransientRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Recompute the projection from `list_all()`.
    ///
    /// Returns the projection held by the index afterwards, which may come
    /// from a concurrent rebuild that started later than this one.
    #[instrument(skip(self))]
    pub async fn rebuild(&self) -> Result<CalendarMarkers> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;

        let meetings =
            match self.retry.run("list_all_meetings", || self.repository.list_all()).await {
                Ok(meetings) => meetings,
                Err(err) => {
                    let mut state = self.state.write();
                    state.failed = state.failed.max(ticket);
                    warn!(ticket, error = %err, "calendar rebuild failed; index marked stale");
                    return Err(err);
                }
            };

        let projected = project_markers(&meetings, &self.dot_color);

        let mut state = self.state.write();
        if ticket > state.generation {
            state.generation = ticket;
            state.markers = projected;
            debug!(ticket, days = state.markers.len(), "calendar index rebuilt");
        } else {
            debug!(ticket, current = state.generation, "discarding superseded calendar rebuild");
        }
        Ok(state.markers.clone())
    }

    /// Rebuild after a store mutation.
    ///
    /// The mutation already happened, so a failure here is not reported to
    /// the caller; it leaves the index stale for the next read.
    pub async fn refresh_after_mutation(&self) {
        if let Err(err) = self.rebuild().await {
            debug!(error = %err, "deferred calendar rebuild to next read");
        }
    }

    /// Current projection, rebuilding first if the index is stale.
    pub async fn markers(&self) -> Result<CalendarMarkers> {
        {
            let state = self.state.read();
            if !state.is_stale() {
                return Ok(state.markers.clone());
            }
        }
        self.rebuild().await
    }

    /// Markers for signed-in callers.
    pub async fn view(&self, ctx: &CallerContext) -> Result<CalendarMarkers> {
        self.policy.require(ctx, Operation::ViewCalendar)?;
        self.markers().await
    }

    /// Markers falling in one month, for month-view widgets.
    pub async fn markers_for_month(
        &self,
        ctx: &CallerContext,
        year: i32,
        month: u32,
    ) -> Result<CalendarMarkers> {
        self.policy.require(ctx, Operation::ViewCalendar)?;
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(MeetbookError::Validation(format!("invalid month: {year}-{month:02}")));
        }

        let markers = self.markers().await?;
        Ok(markers
            .into_iter()
            .filter(|(day, _)| day.year() == year && day.month() == month)
            .collect())
    }

    /// Day selection: the meetings on `day`, ordered by start time.
    pub async fn on_day_selected(&self, ctx: &CallerContext, day: NaiveDate) -> Result<Vec<Meeting>> {
        self.policy.require(ctx, Operation::ListByDay)?;
        meetings_on_day(self.repository.as_ref(), &self.retry, day).await
    }

    /// Whether the next read will rebuild
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.read().is_stale()
    }
}
