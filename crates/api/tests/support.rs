//! Shared harness for command-level tests.

#![allow(dead_code)]

use meetbook_domain::{
    CallerContext, Config, DatabaseConfig, Meeting, NewMeeting, NewUser, StorageBackend,
};
use meetbook_lib::{commands, AppContext};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Application context plus whatever keeps its storage alive
pub struct TestApp {
    pub ctx: AppContext,
    _temp_dir: Option<TempDir>,
}

fn base_config() -> Config {
    let mut config = Config::default();
    config.access.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config.reservations.retry_base_delay_ms = 1;
    config
}

impl TestApp {
    /// Wrap a context whose storage the caller keeps alive.
    pub fn from_context(ctx: AppContext) -> Self {
        Self { ctx, _temp_dir: None }
    }

    /// Memory backend.
    pub async fn in_memory() -> Self {
        let mut config = base_config();
        config.database.storage_backend = StorageBackend::Memory;

        let ctx = AppContext::new_with_config(config).await.expect("context should start");
        Self { ctx, _temp_dir: None }
    }

    /// SQLite backend in a fresh temporary directory.
    pub async fn sqlite() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let mut config = base_config();
        config.database = DatabaseConfig {
            path: temp_dir.path().join("meetbook.db").to_string_lossy().into_owned(),
            pool_size: 4,
            ..DatabaseConfig::default()
        };

        let ctx = AppContext::new_with_config(config).await.expect("context should start");
        Self { ctx, _temp_dir: Some(temp_dir) }
    }

    /// Register through the command surface and sign in.
    pub async fn member(&self, id: &str) -> CallerContext {
        let email = format!("{}@example.com", id.replace('|', "."));
        self.register_and_sign_in(id, &email).await
    }

    /// Register the configured admin email, bootstrap it, sign in.
    pub async fn admin(&self) -> CallerContext {
        let caller = self.register_and_sign_in("auth0|admin", ADMIN_EMAIL).await;
        if caller.identity().is_some_and(|identity| identity.is_admin()) {
            return caller;
        }

        self.ctx.bootstrap_admins().await.expect("admin bootstrap should succeed");
        commands::sign_in(&self.ctx, "auth0|admin").await.expect("admin sign in").context
    }

    async fn register_and_sign_in(&self, id: &str, email: &str) -> CallerContext {
        commands::register_user(
            &self.ctx,
            &CallerContext::anonymous(),
            NewUser {
                id: id.to_string(),
                email: email.to_string(),
                name: "Test".to_string(),
                surname: "User".to_string(),
            },
        )
        .await
        .expect("registration should succeed");

        commands::sign_in(&self.ctx, id).await.expect("sign in should succeed").context
    }

    pub async fn create(&self, admin: &CallerContext, name: &str, at: &str, capacity: i64) -> Meeting {
        commands::create_meeting(
            &self.ctx,
            admin,
            NewMeeting { name: name.to_string(), scheduled_at: at.to_string(), capacity },
        )
        .await
        .expect("meeting should be created")
    }
}
