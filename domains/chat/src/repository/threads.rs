//! Postgres thread repository

use async_trait::async_trait;
use sqlx::PgPool;

use chatai_common::{RepositoryError, Result};

use super::ThreadStore;
use crate::domain::entities::Thread;

#[derive(Clone)]
pub struct ThreadRepository {
    pool: PgPool,
}

impl ThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadStore for ThreadRepository {
    async fn save(&self, thread: &Thread) -> Result<Thread> {
        let saved = match thread.id {
            None => {
                sqlx::query_as::<_, Thread>(
                    r#"
                    INSERT INTO threads (user_id, created_at, updated_at)
                    VALUES ($1, $2, $3)
                    RETURNING id, user_id, created_at, updated_at
                    "#,
                )
                .bind(thread.user_id)
                .bind(thread.created_at)
                .bind(thread.updated_at)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query_as::<_, Thread>(
                    r#"
                    UPDATE threads SET updated_at = $2
                    WHERE id = $1
                    RETURNING id, user_id, created_at, updated_at
                    "#,
                )
                .bind(id)
                .bind(thread.updated_at)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(RepositoryError::from)?;

        tracing::debug!(thread_id = ?saved.id, user_id = saved.user_id, "Thread saved");

        Ok(Thread {
            messages: thread.messages.clone(),
            ..saved
        })
    }

    async fn find_latest_for_user(&self, user_id: i64) -> Result<Option<Thread>> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM threads
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(thread)
    }
}
