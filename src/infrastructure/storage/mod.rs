//! In-memory chat store with optional JSON snapshots

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{ChatMessage, ChatSession};
use crate::domain::traits::{ChatStore, RecordSource};

/// Chat store keeping sessions in memory, in creation order
pub struct MemoryChatStore {
    snapshot_path: Option<PathBuf>,
    sessions: Arc<RwLock<Vec<ChatSession>>>,
    generation: AtomicU64,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self {
            snapshot_path: None,
            sessions: Arc::new(RwLock::new(Vec::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Persist to (and restore from) a JSON file
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Load sessions from the snapshot file, if there is one
    pub async fn init(&self) -> Result<(), StorageError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if !tokio::fs::try_exists(path).await? {
            return Ok(());
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let loaded: Vec<ChatSession> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tracing::info!("Loaded {} sessions from {}", loaded.len(), path.display());
        *self.sessions.write().await = loaded;
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Write every session to the snapshot file
    pub async fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let sessions = self.sessions.read().await;
        let raw = serde_json::to_string_pretty(&*sessions)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(path, raw).await?;
        tracing::debug!("Wrote {} sessions to {}", sessions.len(), path.display());
        Ok(())
    }
}

impl Default for MemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn create_session(&self) -> Result<ChatSession, StorageError> {
        let session = ChatSession::new();
        self.sessions.write().await.push(session.clone());
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.iter().find(|s| s.id() == id).cloned())
    }

    async fn generation(&self) -> Result<u64, StorageError> {
        Ok(self.generation.load(Ordering::SeqCst))
    }

    async fn append_message(
        &self,
        session: &ChatSession,
        message: ChatMessage,
    ) -> Result<ChatSession, StorageError> {
        let mut sessions = self.sessions.write().await;

        // The stored copy is canonical; a caller's copy may be stale.
        let updated = match sessions.iter_mut().find(|s| s.id() == session.id()) {
            Some(stored) => {
                *stored = stored.with_message(message);
                stored.clone()
            }
            None => {
                let updated = session.with_message(message);
                sessions.push(updated.clone());
                updated
            }
        };
        // Bump under the write lock.
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }
}

#[async_trait]
impl RecordSource for MemoryChatStore {
    async fn snapshot(&self) -> Result<Vec<ChatSession>, StorageError> {
        Ok(self.sessions.read().await.clone())
    }
}
