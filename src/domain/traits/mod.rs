//! Domain traits - Abstractions for collaborator implementations

pub mod audio;
pub mod query;
pub mod store;

pub use audio::AudioPlayer;
pub use query::{ExportResult, ExportedTable, QueryEngine, QueryResult};
pub use store::{ChatStore, RecordSource};
