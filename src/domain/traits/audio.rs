use async_trait::async_trait;
use crate::application::errors::AudioError;

/// Audio playback service that speaks responses aloud
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Whether a clip is currently being played
    async fn is_playing(&self) -> bool;

    /// Stop accepting new clips and let the current one finish
    async fn stop_gracefully(&self) -> Result<(), AudioError>;

    /// Drop every queued clip, including the one playing
    async fn clear_immediately(&self) -> Result<(), AudioError>;
}
