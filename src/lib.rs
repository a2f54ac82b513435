//! Slash-commands for a chat application.
//!
//! Commands receive a chat session, an optional acting user and argument
//! tokens, and change the session only by appending messages through a
//! [`ChatStore`](domain::traits::ChatStore).

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::commands::{Command, CommandContext, DuckCommand, ExportPolicy, HelpCommand, StopCommand};
pub use application::errors::{AppError, CommandError};
pub use application::services::{Collaborators, CommandService};
pub use domain::entities::{ChatMessage, ChatSession, CommandInfo, MessageRole, User};
