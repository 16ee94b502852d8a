//! Core Service Layer
//!
//! Shared infrastructure for the chat server: configuration, errors,
//! request extractors, data models, validation and storage.

pub mod config;
pub mod ctx;
pub mod error;
pub mod models;
pub mod router;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use config::{AppState, ChatServerConfig, StoreBackend};
pub use ctx::{JsonBody, Requester};
pub use error::{Error, Result};
pub use router::router;
