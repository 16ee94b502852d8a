//! In-memory store, used by tests and by `--store memory`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ChatStore, OwnedMutation, StoreResult};
use crate::core::models::{Message, Participant};

#[derive(Default)]
pub struct MemoryStore {
    participants: RwLock<HashMap<String, Participant>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_participant(&self, participant: &Participant) -> StoreResult<bool> {
        let mut participants = self.participants.write().await;
        if participants.contains_key(&participant.name) {
            return Ok(false);
        }
        participants.insert(participant.name.clone(), participant.clone());
        Ok(true)
    }

    async fn find_participant(&self, name: &str) -> StoreResult<Option<Participant>> {
        Ok(self.participants.read().await.get(name).cloned())
    }

    async fn touch_participant(
        &self,
        name: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Participant>> {
        let mut participants = self.participants.write().await;
        Ok(participants.get_mut(name).map(|p| {
            p.last_status = at;
            p.clone()
        }))
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        Ok(self.participants.read().await.values().cloned().collect())
    }

    async fn remove_participant_if_stale(
        &self,
        name: &str,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut participants = self.participants.write().await;
        match participants.get(name) {
            Some(p) if p.last_status < cutoff => {
                participants.remove(name);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self) -> StoreResult<Vec<Message>> {
        Ok(self.messages.read().await.clone())
    }

    async fn find_message(&self, id: &str) -> StoreResult<Option<Message>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn update_message_text(
        &self,
        id: &str,
        owner: &str,
        text: &str,
    ) -> StoreResult<OwnedMutation> {
        let mut messages = self.messages.write().await;
        let Some(message) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(OwnedMutation::NotFound);
        };
        if message.from != owner {
            return Ok(OwnedMutation::NotOwner);
        }
        message.text = text.to_string();
        Ok(OwnedMutation::Applied)
    }

    async fn delete_message(&self, id: &str, owner: &str) -> StoreResult<OwnedMutation> {
        let mut messages = self.messages.write().await;
        let Some(idx) = messages.iter().position(|m| m.id == id) else {
            return Ok(OwnedMutation::NotFound);
        };
        if messages[idx].from != owner {
            return Ok(OwnedMutation::NotOwner);
        }
        messages.remove(idx);
        Ok(OwnedMutation::Applied)
    }
}
