//! Message send, edit, delete and feed listing

use serde_json::Value;
use tracing::{info, warn};

use crate::chat::feed;
use crate::core::error::{Error, Result};
use crate::core::models::{Message, MessageInput};
use crate::core::store::{ChatStore, OwnedMutation};
use crate::core::validation;

const UNKNOWN_SENDER: &str = "'from' user does not exist";

/// Resolve the requester to an active participant name, or fail validation.
async fn active_sender<'a>(store: &dyn ChatStore, requester: Option<&'a str>) -> Result<&'a str> {
    let Some(name) = requester else {
        return Err(Error::validation(UNKNOWN_SENDER));
    };
    match store.find_participant(name).await? {
        Some(_) => Ok(name),
        None => {
            warn!("Rejected message from unknown participant {}", name);
            Err(Error::validation(UNKNOWN_SENDER))
        }
    }
}

/// Post a message on behalf of `requester`.
pub async fn send(store: &dyn ChatStore, requester: Option<&str>, body: &Value) -> Result<Message> {
    let MessageInput {
        to,
        text,
        message_type,
    } = validation::message(body).map_err(Error::Validation)?;
    let from = active_sender(store, requester).await?;

    let message = Message::new(from, to, text, message_type);
    store.insert_message(&message).await?;

    info!("Message {} from {} to {}", message.id, message.from, message.to);
    Ok(message)
}

/// Replace the text of one of the requester's messages.
///
/// `to` and `type` in the body are validated but not applied; only the text
/// of a message may change after it is sent.
pub async fn edit(
    store: &dyn ChatStore,
    id: &str,
    requester: Option<&str>,
    body: &Value,
) -> Result<()> {
    let input = validation::message(body).map_err(Error::Validation)?;
    let owner = active_sender(store, requester).await?;

    match store.update_message_text(id, owner, &input.text).await? {
        OwnedMutation::Applied => {
            info!("Message {} edited by {}", id, owner);
            Ok(())
        }
        OwnedMutation::NotFound => Err(Error::MessageNotFound(id.to_string())),
        OwnedMutation::NotOwner => Err(not_owner(id, owner)),
    }
}

/// Delete one of the requester's messages.
pub async fn delete(store: &dyn ChatStore, id: &str, requester: Option<&str>) -> Result<()> {
    // A request without a requester can never own a message, but an unknown
    // id is still reported as missing first.
    let Some(owner) = requester else {
        return match store.find_message(id).await? {
            Some(_) => Err(not_owner(id, "")),
            None => Err(Error::MessageNotFound(id.to_string())),
        };
    };

    match store.delete_message(id, owner).await? {
        OwnedMutation::Applied => {
            info!("Message {} deleted by {}", id, owner);
            Ok(())
        }
        OwnedMutation::NotFound => Err(Error::MessageNotFound(id.to_string())),
        OwnedMutation::NotOwner => Err(not_owner(id, owner)),
    }
}

/// Messages visible to `requester`, the most recent `limit` of them.
pub async fn list_visible(
    store: &dyn ChatStore,
    requester: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Message>> {
    let messages = store.list_messages().await?;
    Ok(feed::visible(&messages, requester, limit))
}

fn not_owner(id: &str, requester: &str) -> Error {
    warn!("{:?} may not modify message {}", requester, id);
    Error::NotMessageOwner {
        id: id.to_string(),
        requester: requester.to_string(),
    }
}
