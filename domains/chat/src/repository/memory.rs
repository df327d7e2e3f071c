//! In-process thread and message stores

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use chatai_common::{Error, Result};

use super::{MessageStore, ThreadStore};
use crate::domain::entities::{Message, Thread};

#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn lock<'a, T>(table: &'a Mutex<Table<T>>, name: &str) -> Result<MutexGuard<'a, Table<T>>> {
    table
        .lock()
        .map_err(|_| Error::Internal(format!("{} store lock poisoned", name)))
}

/// Thread store backed by a vector; ids are assigned sequentially from 1
#[derive(Debug, Default)]
pub struct InMemoryThreadStore {
    table: Mutex<Table<Thread>>,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored threads
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.table, "Thread")?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn save(&self, thread: &Thread) -> Result<Thread> {
        let mut table = lock(&self.table, "Thread")?;

        // Rows never hold messages; those live in the message store
        let row = Thread {
            messages: Vec::new(),
            ..thread.clone()
        };

        let stored = match row.id {
            None => {
                let stored = Thread {
                    id: Some(table.next_id()),
                    ..row
                };
                table.rows.push(stored.clone());
                stored
            }
            Some(id) => {
                let slot = table
                    .rows
                    .iter_mut()
                    .find(|t| t.id == Some(id))
                    .ok_or_else(|| Error::NotFound(format!("Thread {} not found", id)))?;
                slot.updated_at = row.updated_at;
                slot.clone()
            }
        };

        Ok(Thread {
            messages: thread.messages.clone(),
            ..stored
        })
    }

    async fn find_latest_for_user(&self, user_id: i64) -> Result<Option<Thread>> {
        let table = lock(&self.table, "Thread")?;
        Ok(table
            .rows
            .iter()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| (t.updated_at, t.id))
            .cloned())
    }
}

/// Message store backed by a vector; ids are assigned sequentially from 1
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    table: Mutex<Table<Message>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages across all threads
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.table, "Message")?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, message: &Message) -> Result<Message> {
        let mut table = lock(&self.table, "Message")?;
        let stored = Message {
            id: Some(table.next_id()),
            ..message.clone()
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_thread_chronological(&self, thread_id: i64) -> Result<Vec<Message>> {
        let table = lock(&self.table, "Message")?;
        let mut messages: Vec<Message> = table
            .rows
            .iter()
            .filter(|m| m.thread_id == thread_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }
}
