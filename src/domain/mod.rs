//! Domain layer - Core chat objects and collaborator abstractions
//!
//! This layer contains:
//! - Entities: Core objects (User, ChatMessage, ChatSession, CommandInfo)
//! - Traits: Abstractions for collaborators (QueryEngine, AudioPlayer, ChatStore)
//! - Values: Query results and export summaries

pub mod entities;
pub mod traits;
