use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{ChatMessage, ChatSession};

/// Chat session store - owns the canonical copy of every session
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_session(&self) -> Result<ChatSession, StorageError>;

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, StorageError>;

    /// Counter that advances on every write to any session
    async fn generation(&self) -> Result<u64, StorageError>;

    /// Append a message as one step and return the updated session.
    async fn append_message(
        &self,
        session: &ChatSession,
        message: ChatMessage,
    ) -> Result<ChatSession, StorageError>;
}

/// The application's primary record store, as seen by an export
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn snapshot(&self) -> Result<Vec<ChatSession>, StorageError>;
}
