//! In-process audio queue
//!
//! Holds text-to-speech clips waiting to be played. Synthesis and audio
//! output live outside this crate: a speech front end calls `enqueue` and
//! `finish_current`, the queue only tracks what is playing and what comes
//! next. The console binary has no speech front end, so its queue stays
//! empty and `/stop` there always reports that nothing is playing.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::application::errors::AudioError;
use crate::domain::traits::AudioPlayer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub id: String,
    pub text: String,
}

impl AudioClip {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    enabled: bool,
    current: Option<AudioClip>,
    pending: VecDeque<AudioClip>,
}

#[derive(Debug)]
pub struct AudioQueue {
    state: Mutex<QueueState>,
}

impl AudioQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                enabled: true,
                ..Default::default()
            }),
        }
    }

    /// Queue a clip. Rejected while the queue is disabled.
    pub async fn enqueue(&self, clip: AudioClip) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        if !state.enabled {
            tracing::debug!("Audio queue disabled, dropping clip {}", clip.id);
            return Err(AudioError::QueueDisabled(clip.id));
        }
        if state.current.is_none() {
            state.current = Some(clip);
        } else {
            state.pending.push_back(clip);
        }
        Ok(())
    }

    /// Mark the current clip finished and move to the next one
    pub async fn finish_current(&self) -> Option<AudioClip> {
        let mut state = self.state.lock().await;
        state.current = if state.enabled {
            state.pending.pop_front()
        } else {
            None
        };
        state.current.clone()
    }

    pub async fn set_enabled(&self, enabled: bool) {
        self.state.lock().await.enabled = enabled;
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.lock().await.enabled
    }

    pub async fn pending(&self) -> usize {
        self.state.lock().await.pending.len()
    }
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPlayer for AudioQueue {
    async fn is_playing(&self) -> bool {
        self.state.lock().await.current.is_some()
    }

    async fn stop_gracefully(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        state.enabled = false;
        state.pending.clear();
        Ok(())
    }

    async fn clear_immediately(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock().await;
        state.current = None;
        state.pending.clear();
        Ok(())
    }
}
