//! Application layer - Use cases and command handling
//!
//! This layer contains:
//! - Commands: The closed set of slash-commands
//! - Services: Dispatch and per-session serialization
//! - Errors: Domain-specific errors
//! - Messaging: Parsing raw input into commands

pub mod errors;
pub mod commands;
pub mod services;
pub mod messaging;
