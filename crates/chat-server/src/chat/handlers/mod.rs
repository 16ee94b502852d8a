//! Chat Handlers and Router
//!
//! Participant, message and heartbeat routes.

use crate::core::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub mod messages;
pub mod participants;
pub mod status;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            get(participants::list).post(participants::register),
        )
        .route("/messages", get(messages::list).post(messages::send))
        .route(
            "/messages/{id}",
            put(messages::edit).delete(messages::delete),
        )
        .route("/status", post(status::heartbeat))
}
