//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite query engine
//! - Storage: Chat session persistence
//! - Audio: Speech playback queue
//! - Adapters: Terminal front end

pub mod config;
pub mod database;
pub mod storage;
pub mod audio;
pub mod adapters;
