//! Participant handlers

use crate::chat::participants;
use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::models::ParticipantName;
use crate::core::JsonBody;
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

/// POST /participants
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, &'static str)> {
    info!("POST /participants");

    participants::register(state.store.as_ref(), &body).await?;
    Ok((StatusCode::CREATED, "OK"))
}

/// GET /participants
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ParticipantName>>> {
    info!("GET /participants");

    let names = participants::list(state.store.as_ref()).await?;
    Ok(Json(names))
}
