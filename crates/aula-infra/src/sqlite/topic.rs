//! SQLite topic registry.

use aula_core::chat::repository::TopicRepository;
use aula_types::error::RepositoryError;
use aula_types::topic::Topic;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `TopicRepository`.
#[derive(Clone)]
pub struct SqliteTopicRepository {
    pool: DatabasePool,
}

impl SqliteTopicRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct TopicRow {
    name: String,
    subject: String,
    instructions: String,
    content: String,
    created_at: String,
}

impl TopicRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            name: row.try_get("name")?,
            subject: row.try_get("subject")?,
            instructions: row.try_get("instructions")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_topic(self) -> Result<Topic, RepositoryError> {
        Ok(Topic {
            name: self.name,
            subject: self.subject,
            instructions: self.instructions,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl TopicRepository for SqliteTopicRepository {
    async fn read_topic_prompt(&self, topic: &str) -> Result<String, RepositoryError> {
        Ok(self
            .get_topic(topic)
            .await?
            .map(|topic| topic.prompt())
            .unwrap_or_default())
    }

    async fn create_topic(&self, topic: &Topic) -> Result<Topic, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO topics (name, subject, instructions, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&topic.name)
        .bind(&topic.subject)
        .bind(&topic.instructions)
        .bind(&topic.content)
        .bind(format_datetime(&topic.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("topic '{}' already exists", topic.name))
            }
            other => query_error(other),
        })?;

        Ok(topic.clone())
    }

    async fn get_topic(&self, name: &str) -> Result<Option<Topic>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM topics WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let topic_row = TopicRow::from_row(&row).map_err(query_error)?;
                Ok(Some(topic_row.into_topic()?))
            }
            None => Ok(None),
        }
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM topics ORDER BY name ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut topics = Vec::with_capacity(rows.len());
        for row in &rows {
            let topic_row = TopicRow::from_row(row).map_err(query_error)?;
            topics.push(topic_row.into_topic()?);
        }
        Ok(topics)
    }

    async fn count_topics(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM topics")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;
        Ok(count as u64)
    }
}
