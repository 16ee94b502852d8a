//! Core Router
//!
//! Infrastructure routes that are not part of the chat API.

use crate::core::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}
