//! Chat Service Layer
//!
//! Participants, messages, the feed filter and the liveness sweep.

pub mod feed;
pub mod handlers;
pub mod messages;
pub mod participants;
pub mod sweeper;

pub use handlers::router;
pub use sweeper::Sweeper;
