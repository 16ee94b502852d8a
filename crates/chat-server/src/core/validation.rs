//! Request body validation
//!
//! Bodies are checked as raw JSON so that every problem can be reported at
//! once, in the wording clients of the service already expect
//! (`"name" is required`, `"type" must be one of [...]`).

use serde_json::{Map, Value};

use crate::core::models::{MessageInput, MessageType, ParticipantInput};

type Problems = Vec<String>;

/// Validate a `{name}` registration body.
pub fn participant(body: &Value) -> Result<ParticipantInput, Problems> {
    let object = as_object(body)?;
    let mut problems = unknown_keys(object, &["name"]);

    let name = required_string(object, "name", &mut problems);

    match name {
        Some(name) if problems.is_empty() => Ok(ParticipantInput { name }),
        _ => Err(problems),
    }
}

/// Validate a `{to, text, type}` message body.
pub fn message(body: &Value) -> Result<MessageInput, Problems> {
    let object = as_object(body)?;
    let mut problems = unknown_keys(object, &["to", "text", "type"]);

    let to = required_string(object, "to", &mut problems);
    let text = required_string(object, "text", &mut problems);
    let message_type = required_string(object, "type", &mut problems).and_then(|raw| {
        let allowed = MessageType::SENDABLE
            .iter()
            .find(|t| t.as_str() == raw)
            .copied();
        if allowed.is_none() {
            let names: Vec<&str> = MessageType::SENDABLE.iter().map(|t| t.as_str()).collect();
            problems.push(format!("\"type\" must be one of [{}]", names.join(", ")));
        }
        allowed
    });

    match (to, text, message_type) {
        (Some(to), Some(text), Some(message_type)) if problems.is_empty() => Ok(MessageInput {
            to,
            text,
            message_type,
        }),
        _ => Err(problems),
    }
}

/// Parse the optional `limit` query parameter of the feed.
pub fn limit(raw: Option<&str>) -> Result<Option<usize>, Problems> {
    match raw {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(vec!["\"limit\" must be a positive integer".to_string()]),
            Ok(n) => Ok(Some(n)),
        },
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, Problems> {
    body.as_object()
        .ok_or_else(|| vec!["\"value\" must be of type object".to_string()])
}

fn unknown_keys(object: &Map<String, Value>, allowed: &[&str]) -> Problems {
    object
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .map(|key| format!("\"{}\" is not allowed", key))
        .collect()
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    problems: &mut Problems,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            problems.push(format!("\"{}\" is required", field));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            problems.push(format!("\"{}\" is not allowed to be empty", field));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            problems.push(format!("\"{}\" must be a string", field));
            None
        }
    }
}
