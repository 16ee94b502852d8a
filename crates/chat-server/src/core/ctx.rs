use crate::core::error::{Error, Result};
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde_json::Value;

/// Header naming the participant on whose behalf a request is made.
pub const USER_HEADER: &str = "user";

/// The requesting participant, taken from the `user` header.
///
/// The header is optional: each operation decides what a missing requester
/// means (unknown sender, unknown participant, or not the owner).
#[derive(Clone, Debug, Default)]
pub struct Requester(Option<String>);

impl Requester {
    pub fn new(user: Option<String>) -> Self {
        Self(user)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .map(|v| decode_header_text(v.as_bytes()));

        Ok(Requester(user))
    }
}

/// Header values are raw bytes. Clients send names either as UTF-8 or as
/// ISO-8859-1; anything that is not valid UTF-8 is read as the latter.
fn decode_header_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// A JSON request body whose parse failures are validation errors (422)
/// rather than axum's default 400/415 rejections.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Error::validation(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| Error::validation(format!("body is not valid JSON: {}", e)))
    }
}
