//! SQLite-backed store
//!
//! Two tables mirror the two collections. Message order is the autoincrement
//! `seq` column; the public `_id` is a separate UUID so ids never leak
//! insertion positions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::{ChatStore, OwnedMutation, StoreError, StoreResult};
use crate::core::models::{Message, MessageType, Participant};

type MessageRow = (String, String, String, String, String, String);

/// How long a writer waits for a competing writer before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to (and create if missing) the database at `url`.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] SQLite store ready at {}", url);
        Ok(store)
    }

    /// Private in-memory database. A single long-lived connection keeps the
    /// database alive for the lifetime of the pool.
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_db().await?;
        Ok(store)
    }

    async fn init_db(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS participants (
                name TEXT PRIMARY KEY,
                last_status INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                sender TEXT NOT NULL,
                recipient TEXT NOT NULL,
                text TEXT NOT NULL,
                kind TEXT NOT NULL,
                sent_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn participant_from_row((name, last_status): (String, i64)) -> StoreResult<Participant> {
    let last_status = DateTime::<Utc>::from_timestamp_millis(last_status).ok_or_else(|| {
        StoreError::Corrupt(format!("participant {} has invalid lastStatus", name))
    })?;
    Ok(Participant { name, last_status })
}

fn message_from_row((id, from, to, text, kind, time): MessageRow) -> StoreResult<Message> {
    let message_type = MessageType::from_str(&kind).map_err(StoreError::Corrupt)?;
    Ok(Message {
        id,
        from,
        to,
        text,
        message_type,
        time,
    })
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn insert_participant(&self, participant: &Participant) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO participants (name, last_status) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(&participant.name)
        .bind(participant.last_status.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_participant(&self, name: &str) -> StoreResult<Option<Participant>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, last_status FROM participants WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(participant_from_row).transpose()
    }

    async fn touch_participant(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Participant>> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "UPDATE participants SET last_status = ? WHERE name = ? RETURNING name, last_status",
        )
        .bind(at.timestamp_millis())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(participant_from_row).transpose()
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT name, last_status FROM participants ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(participant_from_row).collect()
    }

    async fn remove_participant_if_stale(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE name = ? AND last_status < ?")
            .bind(name)
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, sender, recipient, text, kind, sent_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.message_type.as_str())
        .bind(&message.time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_messages(&self) -> StoreResult<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, sender, recipient, text, kind, sent_at FROM messages ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(message_from_row).collect()
    }

    async fn find_message(&self, id: &str) -> StoreResult<Option<Message>> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, sender, recipient, text, kind, sent_at FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(message_from_row).transpose()
    }

    async fn update_message_text(
        &self,
        id: &str,
        owner: &str,
        text: &str,
    ) -> StoreResult<OwnedMutation> {
        let result = sqlx::query("UPDATE messages SET text = ? WHERE id = ? AND sender = ?")
            .bind(text)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(OwnedMutation::Applied);
        }
        self.explain_miss(id).await
    }

    async fn delete_message(&self, id: &str, owner: &str) -> StoreResult<OwnedMutation> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ? AND sender = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(OwnedMutation::Applied);
        }
        self.explain_miss(id).await
    }
}

impl SqliteStore {
    /// An owner-checked write touched no row: the message is either gone or
    /// belongs to someone else.
    async fn explain_miss(&self, id: &str) -> StoreResult<OwnedMutation> {
        let exists: Option<(String,)> = sqlx::query_as("SELECT sender FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => OwnedMutation::NotOwner,
            None => OwnedMutation::NotFound,
        })
    }
}
