//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `aula-core`: raw queries, a private Row
//! struct, reads on the reader pool and writes on the writer pool.

use aula_core::chat::repository::ChatRepository;
use aula_types::chat::ChatTurn;
use aula_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatTurn.
struct ChatTurnRow {
    id: String,
    user_id: String,
    topic: String,
    message: String,
    response: String,
    response_time_ms: i64,
    created_at: String,
}

impl ChatTurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            topic: row.try_get("topic")?,
            message: row.try_get("message")?,
            response: row.try_get("response")?,
            response_time_ms: row.try_get("response_time_ms")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;

        Ok(ChatTurn {
            id,
            user_id: self.user_id,
            topic: self.topic,
            message: self.message,
            response: self.response,
            response_time_ms: self.response_time_ms.max(0) as u64,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Map rows fetched newest first into turns ordered oldest first.
fn rows_to_turns(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatTurn>, RepositoryError> {
    let mut turns = Vec::with_capacity(rows.len());
    for row in rows.iter().rev() {
        let turn_row = ChatTurnRow::from_row(row).map_err(query_error)?;
        turns.push(turn_row.into_turn()?);
    }
    Ok(turns)
}

impl ChatRepository for SqliteChatRepository {
    async fn read_recent_turns(
        &self,
        user_id: &str,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_turns
               WHERE user_id = ? AND topic = ?
               ORDER BY created_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(user_id)
        .bind(topic)
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows_to_turns(&rows)
    }

    async fn write_turn(&self, turn: &ChatTurn) -> Result<(), RepositoryError> {
        let created_at = format_datetime(&turn.created_at);
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        // Upsert the user first so the turn's foreign key holds.
        sqlx::query(
            r#"INSERT INTO users (user_id, first_seen, last_seen, message_count)
               VALUES (?, ?, ?, 1)
               ON CONFLICT(user_id) DO UPDATE
               SET last_seen = excluded.last_seen, message_count = users.message_count + 1"#,
        )
        .bind(&turn.user_id)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        sqlx::query(
            r#"INSERT INTO chat_turns (id, user_id, topic, message, response, response_time_ms, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(&turn.user_id)
        .bind(&turn.topic)
        .bind(&turn.message)
        .bind(&turn.response)
        .bind(turn.response_time_ms as i64)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn list_turns(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT * FROM chat_turns WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .bind(user_id)
                .bind(limit as i64)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM chat_turns ORDER BY created_at DESC, id DESC LIMIT ?")
                    .bind(limit as i64)
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_error)?;

        rows_to_turns(&rows)
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_turns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count as u64)
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;
        sqlx::query("DELETE FROM chat_turns")
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query("DELETE FROM users")
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        tx.commit().await.map_err(query_error)?;
        Ok(())
    }
}
