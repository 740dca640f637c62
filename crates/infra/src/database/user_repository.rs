//! User repository implementation using SQLite

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_core::users::ports::UserRepository as UserRepositoryPort;
use meetbook_domain::{MeetbookError, Result as DomainResult, Role, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error, StorageError};

const USER_COLUMNS: &str = "id, email, name, surname, role, created_at_ms";

/// SQLite-backed implementation of `UserRepository`
pub struct SqliteUserRepository {
    db: Arc<DbManager>,
}

impl SqliteUserRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn insert(&self, user: User) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    user.id.as_str(),
                    user.email,
                    user.name,
                    user.surname,
                    user.role.as_str(),
                    user.created_at.timestamp_millis(),
                ],
            )
            .map_err(StorageError::from)
            .map_err(|err| {
                if err.is_unique_violation() {
                    MeetbookError::Validation(format!(
                        "user id {} or email {} is already registered",
                        user.id, user.email
                    ))
                } else {
                    map_storage_error(err)
                }
            })?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, id: &UserId) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let id = id.as_str().to_string();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            find_one(&conn, "id", &id).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let email = email.trim().to_lowercase();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            find_one(&conn, "email", &email).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_role(&self, id: &UserId, role: Role) -> DomainResult<Option<User>> {
        let db = Arc::clone(&self.db);
        let id = id.as_str().to_string();

        task::spawn_blocking(move || -> DomainResult<Option<User>> {
            let conn = db.get_connection()?;
            let updated = conn
                .execute("UPDATE users SET role = ?1 WHERE id = ?2", params![role.as_str(), &id])
                .map_err(|err| map_storage_error(err.into()))?;
            if updated == 0 {
                return Ok(None);
            }
            find_one(&conn, "id", &id).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

/// `column` is one of the fixed names above, never caller input.
fn find_one(conn: &Connection, column: &str, value: &str) -> Result<Option<User>, StorageError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
            params![value],
            map_user_row,
        )
        .optional()?;

    row.map(UserRow::into_user).transpose()
}

struct UserRow {
    id: String,
    email: String,
    name: String,
    surname: String,
    role: String,
    created_at_ms: i64,
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        surname: row.get(3)?,
        role: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}

impl UserRow {
    fn into_user(self) -> Result<User, StorageError> {
        let role = Role::from_str(&self.role).map_err(StorageError::corrupt)?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at_ms).ok_or_else(
            || StorageError::corrupt(format!("users.created_at_ms {} out of range", self.created_at_ms)),
        )?;

        Ok(User {
            id: UserId::new(self.id),
            email: self.email,
            name: self.name,
            surname: self.surname,
            role,
            created_at,
        })
    }
}
