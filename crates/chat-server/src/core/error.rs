use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    // Request errors
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    // Participant errors
    #[error("User already exist")]
    ParticipantExists(String),
    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),

    // Message errors
    #[error("message '{0}' not found")]
    MessageNotFound(String),
    #[error("message {id} does not belong to {requester}")]
    NotMessageOwner { id: String, requester: String },

    // Liveness sweep
    #[error("staleness threshold reaches outside the representable time range")]
    StaleWindowOutOfRange,

    // Generic
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ParticipantExists(_) => StatusCode::CONFLICT,
            Error::ParticipantNotFound(_) | Error::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Error::NotMessageOwner { .. } => StatusCode::UNAUTHORIZED,
            Error::StaleWindowOutOfRange | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Validation problems go back as a bare list of messages
        if let Error::Validation(messages) = self {
            return (status, Json(messages)).into_response();
        }

        if let Error::Store(ref e) = self {
            error!("Store failure: {}", e);
        }

        let body = Json(json!({
            "error": {
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
