use super::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered, append-only conversation log.
///
/// Sessions are values: appending produces a new session, so a reader
/// holding an older copy never observes a half-applied change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    id: String,
    created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns a copy of this session with `message` at the end.
    pub fn with_message(&self, message: ChatMessage) -> Self {
        let mut next = self.clone();
        next.messages.push(message);
        next
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
