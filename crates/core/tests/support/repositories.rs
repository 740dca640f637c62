//! Mock repository implementations for testing
//!
//! Provides in-memory mocks for the core ports, enabling deterministic tests
//! without a database. The meeting mock serializes every call behind one
//! mutex, which is enough to make `apply_attendance` atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_core::{MeetingRepository, SessionRepository, UserRepository};
use meetbook_domain::{
    AttendanceChange, Meeting, MeetbookError, MeetingId, Result as DomainResult, Role, Session,
    User, UserId,
};

/// In-memory mock for `MeetingRepository`.
#[derive(Default, Clone)]
pub struct MockMeetingRepository {
    meetings: Arc<Mutex<BTreeMap<MeetingId, Meeting>>>,
}

impl MockMeetingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct view of stored state, bypassing the services.
    pub fn snapshot(&self, id: MeetingId) -> Option<Meeting> {
        self.meetings.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.meetings.lock().unwrap().len()
    }
}

fn by_start(mut meetings: Vec<Meeting>) -> Vec<Meeting> {
    meetings.sort_by_key(|m| m.scheduled_at);
    meetings
}

#[async_trait]
impl MeetingRepository for MockMeetingRepository {
    async fn insert(&self, meeting: Meeting) -> DomainResult<()> {
        self.meetings.lock().unwrap().insert(meeting.id, meeting);
        Ok(())
    }

    async fn find_by_id(&self, id: MeetingId) -> DomainResult<Option<Meeting>> {
        Ok(self.snapshot(id))
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Meeting>> {
        let meetings = self.meetings.lock().unwrap();
        Ok(by_start(
            meetings
                .values()
                .filter(|m| m.scheduled_at >= start && m.scheduled_at < end)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> DomainResult<Vec<Meeting>> {
        Ok(by_start(self.meetings.lock().unwrap().values().cloned().collect()))
    }

    async fn delete(&self, id: MeetingId) -> DomainResult<bool> {
        Ok(self.meetings.lock().unwrap().remove(&id).is_some())
    }

    async fn rename(&self, id: MeetingId, name: String) -> DomainResult<Option<Meeting>> {
        let mut meetings = self.meetings.lock().unwrap();
        Ok(meetings.get_mut(&id).map(|meeting| {
            *meeting = meeting.renamed(name);
            meeting.clone()
        }))
    }

    async fn apply_attendance(
        &self,
        id: MeetingId,
        change: AttendanceChange,
    ) -> DomainResult<Meeting> {
        let mut meetings = self.meetings.lock().unwrap();
        let current = meetings
            .get(&id)
            .ok_or_else(|| MeetbookError::NotFound(format!("meeting {id}")))?;
        let next = current.apply(&change)?;
        meetings.insert(id, next.clone());
        Ok(next)
    }
}

/// Wraps [`MockMeetingRepository`] and fails the first N calls of the
/// selected kinds with `Transient`.
#[derive(Clone)]
pub struct FlakyMeetingRepository {
    inner: MockMeetingRepository,
    attendance_failures: Arc<AtomicU32>,
    list_failures: Arc<AtomicU32>,
    attendance_calls: Arc<AtomicU32>,
}

impl FlakyMeetingRepository {
    pub fn new(inner: MockMeetingRepository) -> Self {
        Self {
            inner,
            attendance_failures: Arc::new(AtomicU32::new(0)),
            list_failures: Arc::new(AtomicU32::new(0)),
            attendance_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn fail_attendance(&self, times: u32) {
        self.attendance_failures.store(times, Ordering::SeqCst);
    }

    pub fn fail_list_all(&self, times: u32) {
        self.list_failures.store(times, Ordering::SeqCst);
    }

    pub fn attendance_calls(&self) -> u32 {
        self.attendance_calls.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
    }
}

#[async_trait]
impl MeetingRepository for FlakyMeetingRepository {
    async fn insert(&self, meeting: Meeting) -> DomainResult<()> {
        self.inner.insert(meeting).await
    }

    async fn find_by_id(&self, id: MeetingId) -> DomainResult<Option<Meeting>> {
        self.inner.find_by_id(id).await
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Meeting>> {
        self.inner.find_in_range(start, end).await
    }

    async fn list_all(&self) -> DomainResult<Vec<Meeting>> {
        if Self::take_failure(&self.list_failures) {
            return Err(MeetbookError::Transient("store unreachable".into()));
        }
        self.inner.list_all().await
    }

    async fn delete(&self, id: MeetingId) -> DomainResult<bool> {
        self.inner.delete(id).await
    }

    async fn rename(&self, id: MeetingId, name: String) -> DomainResult<Option<Meeting>> {
        self.inner.rename(id, name).await
    }

    async fn apply_attendance(
        &self,
        id: MeetingId,
        change: AttendanceChange,
    ) -> DomainResult<Meeting> {
        self.attendance_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.attendance_failures) {
            return Err(MeetbookError::Transient("database is locked".into()));
        }
        self.inner.apply_attendance(id, change).await
    }
}

/// In-memory mock for `UserRepository`.
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn remove(&self, id: &UserId) {
        self.users.lock().unwrap().remove(id);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(&self, user: User) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(MeetbookError::Validation("user already exists".into()));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
    }

    async fn set_role(&self, id: &UserId, role: Role) -> DomainResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.get_mut(id).map(|user| {
            user.role = role;
            user.clone()
        }))
    }
}

/// In-memory mock for `SessionRepository`.
#[derive(Default, Clone)]
pub struct MockSessionRepository {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn stored_hashes(&self) -> Vec<String> {
        self.sessions.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, token_hash: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(token_hash).cloned()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn insert(&self, session: Session) -> DomainResult<()> {
        self.sessions.lock().unwrap().insert(session.token_hash.clone(), session);
        Ok(())
    }

    async fn find(&self, token_hash: &str) -> DomainResult<Option<Session>> {
        Ok(self.get(token_hash))
    }

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(token_hash) {
            session.last_seen_at = at;
        }
        Ok(())
    }

    async fn delete(&self, token_hash: &str) -> DomainResult<bool> {
        Ok(self.sessions.lock().unwrap().remove(token_hash).is_some())
    }
}
