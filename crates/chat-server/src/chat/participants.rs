//! Participant registration, heartbeat and listing

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::core::error::{Error, Result};
use crate::core::models::{Message, Participant, ParticipantName};
use crate::core::store::ChatStore;
use crate::core::validation;

/// Register a new participant and announce them to the room.
pub async fn register(store: &dyn ChatStore, body: &Value) -> Result<Participant> {
    let input = validation::participant(body).map_err(Error::Validation)?;

    let participant = Participant::new(input.name, Utc::now());
    if !store.insert_participant(&participant).await? {
        warn!("Registration rejected, {} already present", participant.name);
        return Err(Error::ParticipantExists(participant.name));
    }

    store.insert_message(&Message::joined(&participant.name)).await?;

    info!("{} joined the room", participant.name);
    Ok(participant)
}

/// Refresh a participant's liveness timestamp.
pub async fn heartbeat(store: &dyn ChatStore, name: Option<&str>) -> Result<Participant> {
    let Some(name) = name else {
        return Err(Error::ParticipantNotFound(String::new()));
    };

    store
        .touch_participant(name, Utc::now())
        .await?
        .ok_or_else(|| Error::ParticipantNotFound(name.to_string()))
}

pub async fn list(store: &dyn ChatStore) -> Result<Vec<ParticipantName>> {
    let participants = store.list_participants().await?;
    Ok(participants.into_iter().map(ParticipantName::from).collect())
}
