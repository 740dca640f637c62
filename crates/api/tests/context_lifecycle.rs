//! Application context over the SQLite backend

mod support;

use meetbook_domain::{CallerContext, Config, DatabaseConfig, NewUser, Role, StorageBackend};
use meetbook_lib::{commands, AppContext};
use support::{TestApp, ADMIN_EMAIL};
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sqlite_context_starts_healthy() {
    let app = TestApp::sqlite().await;

    app.ctx.health_check().unwrap();
    assert_eq!(app.ctx.storage.backend(), StorageBackend::Sqlite);
    let db = app.ctx.storage.db.as_ref().expect("sqlite storage exposes its manager");
    assert!(db.schema_version().unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn configured_admin_is_promoted_on_next_start() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.access.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config.database = DatabaseConfig {
        path: temp_dir.path().join("meetbook.db").to_string_lossy().into_owned(),
        ..DatabaseConfig::default()
    };

    {
        let ctx = AppContext::new_with_config(config.clone()).await.unwrap();
        let user = commands::register_user(
            &ctx,
            &CallerContext::anonymous(),
            NewUser {
                id: "auth0|root".to_string(),
                email: ADMIN_EMAIL.to_string(),
                name: "Root".to_string(),
                surname: "Operator".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.role, Role::User);
    }

    let ctx = AppContext::new_with_config(config).await.unwrap();
    let sign_in = commands::sign_in(&ctx, "auth0|root").await.unwrap();
    let identity = sign_in.context.identity().unwrap();
    assert_eq!(identity.role, Role::Admin);

    // Re-running the bootstrap is a no-op for users already promoted
    assert_eq!(ctx.bootstrap_admins().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn meetings_survive_a_restart() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.access.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config.database.path = temp_dir.path().join("meetbook.db").to_string_lossy().into_owned();

    let meeting_id = {
        let app = TestApp::from_context(AppContext::new_with_config(config.clone()).await.unwrap());
        let admin = app.admin().await;
        let alice = app.member("auth0|alice").await;
        let meeting = app.create(&admin, "Standup", "2024-03-10T09:00:00Z", 3).await;
        commands::join_meeting(&app.ctx, &alice, &meeting.id.to_string()).await.unwrap();
        meeting.id.to_string()
    };

    let ctx = AppContext::new_with_config(config).await.unwrap();
    let alice = commands::sign_in(&ctx, "auth0|alice").await.unwrap().context;
    let meeting = commands::get_meeting(&ctx, &alice, &meeting_id).await.unwrap();
    assert_eq!(meeting.available_seats, 2);
    assert_eq!(meeting.attendees.len(), 1);

    let markers = commands::calendar_markers(&ctx, &alice, None).await.unwrap();
    assert_eq!(markers.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.database.storage_backend = StorageBackend::Memory;
    config.database.pool_size = 0;

    assert!(AppContext::new_with_config(config).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn created_meeting_matches_what_sqlite_returns() {
    let app = TestApp::sqlite().await;
    let admin = app.admin().await;

    let created = app.create(&admin, "Review", "2024-03-10T09:00:00.123456Z", 3).await;
    let fetched =
        commands::get_meeting(&app.ctx, &admin, &created.id.to_string()).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(created.scheduled_at.timestamp_subsec_micros(), 123_000);
}
