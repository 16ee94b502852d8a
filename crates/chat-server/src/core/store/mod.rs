//! Chat storage module
//!
//! The service talks to storage only through [`ChatStore`], an injected
//! handle over two collections: participants and messages. Every operation
//! that used to be a check followed by a write is a single atomic call here.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::models::{Message, Participant};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of an owner-checked mutation on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedMutation {
    Applied,
    NotFound,
    NotOwner,
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert a participant unless one with the same name exists.
    /// Returns `false` when the name was already taken.
    async fn insert_participant(&self, participant: &Participant) -> StoreResult<bool>;

    async fn find_participant(&self, name: &str) -> StoreResult<Option<Participant>>;

    /// Refresh `last_status`, returning the updated record if it exists.
    async fn touch_participant(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Participant>>;

    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;

    /// Delete the participant only if their `last_status` is still before
    /// `cutoff`. Returns whether a record was removed.
    async fn remove_participant_if_stale(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn insert_message(&self, message: &Message) -> StoreResult<()>;

    /// All messages in insertion order, oldest first.
    async fn list_messages(&self) -> StoreResult<Vec<Message>>;

    async fn find_message(&self, id: &str) -> StoreResult<Option<Message>>;

    /// Replace the text of message `id` if `owner` sent it.
    async fn update_message_text(
        &self,
        id: &str,
        owner: &str,
        text: &str,
    ) -> StoreResult<OwnedMutation>;

    /// Delete message `id` if `owner` sent it.
    async fn delete_message(&self, id: &str, owner: &str) -> StoreResult<OwnedMutation>;
}
