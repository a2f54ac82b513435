//! Application layer errors

use thiserror::Error;

/// Top-level application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Command already registered: {0}")]
    Duplicate(String),

    #[error("Export failed: {0}")]
    Export(#[source] QueryError),

    #[error("Query failed: {0}")]
    Query(#[source] QueryError),

    #[error("Table lookup failed for {table}: {source}")]
    Lookup {
        table: String,
        #[source]
        source: QueryError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Query engine errors
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid query: {0}")]
    Invalid(String),

    #[error("Export source unavailable: {0}")]
    Source(#[from] StorageError),

    #[error("Engine task failed: {0}")]
    Task(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Audio playback errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio queue is disabled, dropped clip {0}")]
    QueueDisabled(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
