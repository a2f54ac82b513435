//! Application services - Command dispatch

pub mod command_service;

pub use command_service::{Collaborators, CommandService};
