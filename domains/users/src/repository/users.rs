//! Postgres user repository

use async_trait::async_trait;
use sqlx::PgPool;

use chatai_common::{RepositoryError, Result};

use super::UserStore;
use crate::domain::entities::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn save(&self, user: &User) -> Result<User> {
        let saved = match user.id {
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (email, password_hash, name, role, registered_at)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, email, password_hash, name, role, registered_at
                    "#,
                )
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.name)
                .bind(user.role)
                .bind(user.registered_at)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users SET
                        email = $2,
                        password_hash = $3,
                        name = $4,
                        role = $5
                    WHERE id = $1
                    RETURNING id, email, password_hash, name, role, registered_at
                    "#,
                )
                .bind(id)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.name)
                .bind(user.role)
                .fetch_one(&self.pool)
                .await
            }
        };

        match saved.map_err(RepositoryError::from) {
            Ok(user) => Ok(user),
            Err(RepositoryError::AlreadyExists) => Err(chatai_common::Error::Conflict(format!(
                "A user with email {} already exists",
                user.email
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, registered_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, role, registered_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
