//! Heartbeat handler

use crate::chat::participants;
use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::models::Participant;
use crate::core::Requester;
use axum::{extract::State, Json};
use tracing::info;

/// POST /status
pub async fn heartbeat(
    requester: Requester,
    State(state): State<AppState>,
) -> Result<Json<Participant>> {
    info!("POST /status - {:?}", requester.name());

    let participant = participants::heartbeat(state.store.as_ref(), requester.name()).await?;
    Ok(Json(participant))
}
