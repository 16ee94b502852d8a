//! Message feed filter

use crate::core::models::Message;

/// Select the messages visible to `requester`.
///
/// Walks the feed newest to oldest so that `limit` keeps the most recent
/// visible messages, then restores chronological order.
pub fn visible(messages: &[Message], requester: Option<&str>, limit: Option<usize>) -> Vec<Message> {
    let limit = limit.unwrap_or(usize::MAX);

    let mut selected: Vec<Message> = messages
        .iter()
        .rev()
        .filter(|m| m.is_visible_to(requester))
        .take(limit)
        .cloned()
        .collect();

    selected.reverse();
    selected
}
