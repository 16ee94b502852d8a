use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Recipient marker for messages visible to everyone in the room.
pub const BROADCAST: &str = "Todos";

/// Text of the notice posted when a participant joins.
pub const JOIN_TEXT: &str = "entra na sala...";

/// Text of the notice posted when a participant is evicted.
pub const LEAVE_TEXT: &str = "sai da sala...";

/// An active chat participant tracked for liveness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    #[serde(rename = "lastStatus", with = "chrono::serde::ts_milliseconds")]
    pub last_status: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_status: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_status,
        }
    }

    /// Whether the participant has been idle for longer than `stale_after`.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: chrono::Duration) -> bool {
        now - self.last_status > stale_after
    }
}

/// Public view of a participant returned by `GET /participants`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantName {
    pub name: String,
}

impl From<Participant> for ParticipantName {
    fn from(participant: Participant) -> Self {
        Self {
            name: participant.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Message,
    PrivateMessage,
    Status,
}

impl MessageType {
    /// Types a client may post; `status` is reserved for system notices.
    pub const SENDABLE: [MessageType; 2] = [MessageType::Message, MessageType::PrivateMessage];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Message => "message",
            MessageType::PrivateMessage => "private_message",
            MessageType::Status => "status",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageType::Message),
            "private_message" => Ok(MessageType::PrivateMessage),
            "status" => Ok(MessageType::Status),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub time: String,
}

impl Message {
    /// Create a message stamped with the current local wall-clock time.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        message_type: MessageType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from: from.into(),
            to: to.into(),
            text: text.into(),
            message_type,
            time: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub fn joined(name: &str) -> Self {
        Self::new(name, BROADCAST, JOIN_TEXT, MessageType::Status)
    }

    pub fn left(name: &str) -> Self {
        Self::new(name, BROADCAST, LEAVE_TEXT, MessageType::Status)
    }

    pub fn is_broadcast(&self) -> bool {
        self.to == BROADCAST
    }

    /// A message is visible to a requester when it is a broadcast, addressed
    /// to them, or sent by them.
    pub fn is_visible_to(&self, requester: Option<&str>) -> bool {
        if self.is_broadcast() {
            return true;
        }
        match requester {
            Some(user) => self.to == user || self.from == user,
            None => false,
        }
    }
}

/// Validated body of `POST /participants`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInput {
    pub name: String,
}

/// Validated body of `POST /messages` and `PUT /messages/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInput {
    pub to: String,
    pub text: String,
    pub message_type: MessageType,
}
