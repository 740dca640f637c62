//! Concurrent seat changes against one SQLite meeting row.

mod support;

use std::sync::Arc;

use futures::future::join_all;
use meetbook_core::{MeetingRepository, ReservationCoordinator};
use meetbook_domain::{AttendanceChange, CallerContext, Identity, MeetbookError, Role, UserId};

use support::{at, meeting, TestDatabase};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_oversell() {
    const CAPACITY: u32 = 5;
    const CONTENDERS: usize = 20;

    let db = TestDatabase::new();
    let repo = Arc::new(db.meetings());
    let standup = meeting("Standup", at(2024, 3, 10, 9, 0), CAPACITY);
    repo.insert(standup.clone()).await.unwrap();
    let meeting_id = standup.id;

    let attempts = (0..CONTENDERS).map(|n| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            let user_id = UserId::new(format!("user-{n}"));
            repo.apply_attendance(meeting_id, AttendanceChange::Join(user_id)).await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task should not panic"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let sold_out =
        results.iter().filter(|r| matches!(r, Err(MeetbookError::NoSeats(_)))).count();
    assert_eq!(successes, CAPACITY as usize);
    assert_eq!(sold_out, CONTENDERS - CAPACITY as usize);

    let stored = repo.find_by_id(standup.id).await.unwrap().expect("meeting exists");
    assert_eq!(stored.available_seats, 0);
    assert_eq!(stored.attendees.len(), CAPACITY as usize);
    assert_eq!(stored.version, u64::from(CAPACITY));
    assert_eq!(db.count("SELECT COUNT(*) FROM meeting_attendees"), i64::from(CAPACITY));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_user_racing_itself_gets_one_seat() {
    let db = TestDatabase::new();
    let repo = Arc::new(db.meetings());
    let standup = meeting("Standup", at(2024, 3, 10, 9, 0), 3);
    repo.insert(standup.clone()).await.unwrap();
    let meeting_id = standup.id;

    let attempts = (0..6).map(|_| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            repo.apply_attendance(meeting_id, AttendanceChange::Join(UserId::new("ana"))).await
        })
    });
    let results: Vec<_> = join_all(attempts).await.into_iter().map(Result::unwrap).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| matches!(err, MeetbookError::AlreadyJoined(_))));

    let stored = repo.find_by_id(standup.id).await.unwrap().unwrap();
    assert_eq!(stored.available_seats, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn coordinator_over_sqlite_round_trips() {
    let db = TestDatabase::new();
    let repo: Arc<dyn MeetingRepository> = Arc::new(db.meetings());
    let standup = meeting("Standup", at(2024, 3, 10, 9, 0), 2);
    repo.insert(standup.clone()).await.unwrap();

    let coordinator = ReservationCoordinator::new(Arc::clone(&repo));
    let ana = CallerContext::authenticated(Identity::new(UserId::new("ana"), Role::User));

    let joined = coordinator.join(&ana, standup.id).await.unwrap();
    assert_eq!(joined.available_seats, 1);
    let left = coordinator.leave(&ana, standup.id).await.unwrap();

    assert_eq!(left.available_seats, standup.available_seats);
    assert_eq!(left.attendees, standup.attendees);
}
