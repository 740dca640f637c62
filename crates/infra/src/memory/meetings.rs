//! Meeting storage over a concurrent map of per-meeting slots
//!
//! Each meeting lives in its own mutex-guarded slot, so attendance changes on
//! different meetings never contend. The map shard lock and a slot lock are
//! never held at the same time.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use meetbook_core::meetings::ports::MeetingRepository;
use meetbook_domain::{AttendanceChange, Meeting, MeetbookError, MeetingId, Result};
use parking_lot::Mutex;

/// `None` marks a meeting deleted while a writer still held its slot.
type Slot = Arc<Mutex<Option<Meeting>>>;

#[derive(Default)]
pub struct MemoryMeetingRepository {
    meetings: DashMap<MeetingId, Slot>,
}

impl MemoryMeetingRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: MeetingId) -> Option<Slot> {
        self.meetings.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Live meetings matching `keep`, ordered by start time then id.
    fn collect(&self, keep: impl Fn(&Meeting) -> bool) -> Vec<Meeting> {
        let slots: Vec<Slot> = self.meetings.iter().map(|entry| Arc::clone(entry.value())).collect();

        let mut meetings: Vec<Meeting> = slots
            .iter()
            .filter_map(|slot| slot.lock().as_ref().filter(|meeting| keep(*meeting)).cloned())
            .collect();
        meetings.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
        meetings
    }
}

#[async_trait]
impl MeetingRepository for MemoryMeetingRepository {
    async fn insert(&self, meeting: Meeting) -> Result<()> {
        match self.meetings.entry(meeting.id) {
            Entry::Occupied(_) => {
                Err(MeetbookError::Validation(format!("meeting {} already exists", meeting.id)))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(Some(meeting))));
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: MeetingId) -> Result<Option<Meeting>> {
        Ok(self.slot(id).and_then(|slot| slot.lock().clone()))
    }

    async fn find_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Meeting>> {
        Ok(self.collect(|meeting| meeting.scheduled_at >= start && meeting.scheduled_at < end))
    }

    async fn list_all(&self) -> Result<Vec<Meeting>> {
        Ok(self.collect(|_| true))
    }

    async fn delete(&self, id: MeetingId) -> Result<bool> {
        let Some((_, slot)) = self.meetings.remove(&id) else {
            return Ok(false);
        };
        let existed = slot.lock().take().is_some();
        Ok(existed)
    }

    async fn rename(&self, id: MeetingId, name: String) -> Result<Option<Meeting>> {
        let Some(slot) = self.slot(id) else {
            return Ok(None);
        };

        let mut guard = slot.lock();
        let Some(current) = guard.as_ref() else {
            return Ok(None);
        };
        let next = current.renamed(name);
        *guard = Some(next.clone());
        Ok(Some(next))
    }

    async fn apply_attendance(&self, id: MeetingId, change: AttendanceChange) -> Result<Meeting> {
        let not_found = || MeetbookError::NotFound(format!("meeting {id} not found"));
        let slot = self.slot(id).ok_or_else(not_found)?;

        let mut guard = slot.lock();
        let next = guard.as_ref().ok_or_else(not_found)?.apply(&change)?;
        *guard = Some(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use meetbook_domain::UserId;

    use super::*;

    async fn join_concurrently(
        repo: &Arc<MemoryMeetingRepository>,
        id: MeetingId,
        users: usize,
    ) -> Vec<Result<Meeting>> {
        let handles: Vec<_> = (0..users)
            .map(|n| {
                let repo = Arc::clone(repo);
                let change = AttendanceChange::Join(UserId::new(format!("user-{n}")));
                tokio::spawn(async move { repo.apply_attendance(id, change).await })
            })
            .collect();

        let mut results = Vec::with_capacity(users);
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    fn meeting_at(name: &str, hour: u32, capacity: u32) -> Meeting {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap();
        Meeting::scheduled(name.into(), at, capacity, at)
    }

    #[tokio::test]
    async fn list_all_orders_by_start_time() {
        let repo = MemoryMeetingRepository::new();
        repo.insert(meeting_at("late", 15, 2)).await.unwrap();
        repo.insert(meeting_at("early", 8, 2)).await.unwrap();

        let names: Vec<_> =
            repo.list_all().await.unwrap().into_iter().map(|meeting| meeting.name).collect();
        assert_eq!(names, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn deleted_meeting_rejects_attendance() {
        let repo = MemoryMeetingRepository::new();
        let meeting = meeting_at("standup", 9, 2);
        repo.insert(meeting.clone()).await.unwrap();

        assert!(repo.delete(meeting.id).await.unwrap());
        assert!(!repo.delete(meeting.id).await.unwrap());

        let err = repo
            .apply_attendance(meeting.id, AttendanceChange::Join(UserId::new("ana")))
            .await
            .unwrap_err();
        assert!(matches!(err, MeetbookError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_change_keeps_stored_state() {
        let repo = MemoryMeetingRepository::new();
        let meeting = meeting_at("standup", 9, 1);
        repo.insert(meeting.clone()).await.unwrap();

        let err = repo
            .apply_attendance(meeting.id, AttendanceChange::Leave(UserId::new("ana")))
            .await
            .unwrap_err();
        assert!(matches!(err, MeetbookError::NotJoined(_)));
        assert_eq!(repo.find_by_id(meeting.id).await.unwrap(), Some(meeting));
    }

    #[tokio::test]
    async fn rename_bumps_version() {
        let repo = MemoryMeetingRepository::new();
        let meeting = meeting_at("standup", 9, 1);
        repo.insert(meeting.clone()).await.unwrap();

        let renamed = repo.rename(meeting.id, "retro".into()).await.unwrap().unwrap();
        assert_eq!(renamed.name, "retro");
        assert_eq!(renamed.version, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_joins_never_overbook() {
        let repo = Arc::new(MemoryMeetingRepository::new());
        let meeting = meeting_at("all-hands", 10, 5);
        repo.insert(meeting.clone()).await.unwrap();

        let results = join_concurrently(&repo, meeting.id, 24).await;

        let joined = results.iter().filter(|result| result.is_ok()).count();
        let full = results
            .iter()
            .filter(|result| matches!(result, Err(MeetbookError::NoSeats(_))))
            .count();
        assert_eq!(joined, 5);
        assert_eq!(full, 19);

        let stored = repo.find_by_id(meeting.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.attendees.len(), 5);
        assert_eq!(stored.version, 5);
        stored.check_invariants().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn joins_racing_delete_leave_nothing_behind() {
        let repo = Arc::new(MemoryMeetingRepository::new());
        let meeting = meeting_at("retro", 16, 3);
        repo.insert(meeting.clone()).await.unwrap();

        let id = meeting.id;
        let deleters: Vec<_> = (0..2)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.delete(id).await })
            })
            .collect();
        let results = join_concurrently(&repo, meeting.id, 12).await;

        let mut deleted = 0;
        for handle in deleters {
            if handle.await.unwrap().unwrap() {
                deleted += 1;
            }
        }
        assert_eq!(deleted, 1);

        let joined = results.iter().filter(|result| result.is_ok()).count();
        assert!(joined <= 3, "{joined} joins succeeded on a 3-seat meeting");
        for result in &results {
            assert!(
                matches!(result, Ok(_) | Err(MeetbookError::NotFound(_) | MeetbookError::NoSeats(_))),
                "unexpected outcome: {result:?}"
            );
        }

        assert_eq!(repo.find_by_id(meeting.id).await.unwrap(), None);
        assert!(repo.list_all().await.unwrap().is_empty());
        let err = repo
            .apply_attendance(meeting.id, AttendanceChange::Join(UserId::new("late")))
            .await
            .unwrap_err();
        assert!(matches!(err, MeetbookError::NotFound(_)));
    }
}
