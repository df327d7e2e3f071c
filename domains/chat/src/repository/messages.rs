//! Postgres message repository

use async_trait::async_trait;
use sqlx::PgPool;

use chatai_common::{RepositoryError, Result};

use super::MessageStore;
use crate::domain::entities::Message;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn save(&self, message: &Message) -> Result<Message> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (thread_id, question, answer, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, thread_id, question, answer, created_at
            "#,
        )
        .bind(message.thread_id)
        .bind(&message.question)
        .bind(&message.answer)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        Ok(created)
    }

    async fn find_by_thread_chronological(&self, thread_id: i64) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, thread_id, question, answer, created_at
            FROM messages
            WHERE thread_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
