//! SQLite user registry.

use aula_core::chat::repository::UserRepository;
use aula_types::error::RepositoryError;
use aula_types::user::UserProfile;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    user_id: String,
    classroom: Option<String>,
    first_seen: String,
    last_seen: String,
    message_count: i64,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            classroom: row.try_get("classroom")?,
            first_seen: row.try_get("first_seen")?,
            last_seen: row.try_get("last_seen")?,
            message_count: row.try_get("message_count")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        Ok(UserProfile {
            user_id: self.user_id,
            classroom: self.classroom,
            first_seen: parse_datetime(&self.first_seen)?,
            last_seen: parse_datetime(&self.last_seen)?,
            message_count: self.message_count.max(0) as u64,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    /// Registering a known user keeps its history; a new classroom replaces
    /// the old one, a missing classroom leaves it unchanged.
    async fn register_user(
        &self,
        user_id: &str,
        classroom: Option<&str>,
    ) -> Result<UserProfile, RepositoryError> {
        let now = format_datetime(&Utc::now());

        sqlx::query(
            r#"INSERT INTO users (user_id, classroom, first_seen, last_seen, message_count)
               VALUES (?, ?, ?, ?, 0)
               ON CONFLICT(user_id) DO UPDATE
               SET classroom = COALESCE(excluded.classroom, users.classroom)"#,
        )
        .bind(user_id)
        .bind(classroom)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        // Read back on the writer so the row is visible immediately.
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool.writer)
            .await
            .map_err(query_error)?;

        UserRow::from_row(&row).map_err(query_error)?.into_profile()
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| UserRow::from_row(&row).map_err(query_error)?.into_profile())
            .transpose()
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count as u64)
    }
}
