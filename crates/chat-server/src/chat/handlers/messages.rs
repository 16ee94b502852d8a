//! Message handlers

use crate::chat::messages;
use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::models::Message;
use crate::core::{validation, JsonBody, Requester};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<String>,
}

/// POST /messages
pub async fn send(
    requester: Requester,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, &'static str)> {
    info!("POST /messages - {:?}", requester.name());

    messages::send(state.store.as_ref(), requester.name(), &body).await?;
    Ok((StatusCode::CREATED, "OK"))
}

/// GET /messages
pub async fn list(
    requester: Requester,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<Message>>> {
    info!("GET /messages - {:?} limit={:?}", requester.name(), query.limit);

    let limit = validation::limit(query.limit.as_deref()).map_err(Error::Validation)?;
    let feed = messages::list_visible(state.store.as_ref(), requester.name(), limit).await?;
    Ok(Json(feed))
}

/// PUT /messages/:id
pub async fn edit(
    Path(id): Path<String>,
    requester: Requester,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, &'static str)> {
    info!("PUT /messages/{} - {:?}", id, requester.name());

    messages::edit(state.store.as_ref(), &id, requester.name(), &body).await?;
    Ok((StatusCode::CREATED, "OK"))
}

/// DELETE /messages/:id
pub async fn delete(
    Path(id): Path<String>,
    requester: Requester,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    info!("DELETE /messages/{} - {:?}", id, requester.name());

    messages::delete(state.store.as_ref(), &id, requester.name()).await?;
    Ok(StatusCode::OK)
}
