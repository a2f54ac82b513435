//! Message handling - Turning raw chat input into commands

pub mod parser;

pub use parser::{CommandParser, ParsedCommand};
