//! In-process user store

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use chatai_common::{Error, Result};

use super::UserStore;
use crate::domain::entities::User;

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    last_id: i64,
}

/// User store backed by a vector; ids are assigned sequentially from 1
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("User store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, user: &User) -> Result<User> {
        let mut inner = self.lock()?;

        let email_taken = inner
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id);
        if email_taken {
            return Err(Error::Conflict(format!(
                "A user with email {} already exists",
                user.email
            )));
        }

        match user.id {
            None => {
                inner.last_id += 1;
                let stored = User {
                    id: Some(inner.last_id),
                    ..user.clone()
                };
                inner.users.push(stored.clone());
                Ok(stored)
            }
            Some(id) => {
                let slot = inner
                    .users
                    .iter_mut()
                    .find(|u| u.id == Some(id))
                    .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;
                *slot = user.clone();
                Ok(user.clone())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.id == Some(id)).cloned())
    }
}
