//! Front ends that feed user input into the command service

pub mod console;

pub use console::ConsoleAdapter;
