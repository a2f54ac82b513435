//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chatcraft_commands::application::errors::QueryError;
use chatcraft_commands::domain::traits::{ExportResult, ExportedTable, QueryEngine, QueryResult};
use chatcraft_commands::infrastructure::audio::AudioQueue;
use chatcraft_commands::infrastructure::storage::MemoryChatStore;
use chatcraft_commands::{Collaborators, CommandService, DuckCommand, HelpCommand, StopCommand};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Query engine with canned answers.
///
/// `SHOW TABLES` lists `tables` in the given order, `DESCRIBE` sleeps for the
/// table's configured delay before answering, and anything containing
/// `BOGUS` is rejected.
#[derive(Default)]
pub struct ScriptedEngine {
    pub tables: Vec<String>,
    pub exported: Vec<(String, u64)>,
    pub describe_delays: HashMap<String, u64>,
    pub missing: Vec<String>,
    pub fail_export: bool,
    pub exports: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
    pub describe_finished: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn with_tables(names: &[&str]) -> Self {
        Self {
            tables: names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn exported(mut self, name: &str, rows: u64) -> Self {
        self.exported.push((name.to_string(), rows));
        self
    }

    pub fn describe_delay(mut self, name: &str, millis: u64) -> Self {
        self.describe_delays.insert(name.to_string(), millis);
        self
    }

    pub fn missing(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    pub fn failing_export(mut self) -> Self {
        self.fail_export = true;
        self
    }

    pub fn export_count(&self) -> usize {
        self.exports.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryEngine for ScriptedEngine {
    async fn run_query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        self.queries.lock().unwrap().push(sql.to_string());

        if sql == "SHOW TABLES" {
            return Ok(QueryResult::new(
                vec!["name".to_string()],
                self.tables.iter().map(|t| vec![json!(t)]).collect(),
            ));
        }

        if let Some(name) = sql.strip_prefix("DESCRIBE ") {
            let name = name.trim_matches('"').to_string();
            if let Some(millis) = self.describe_delays.get(&name) {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
            self.describe_finished.lock().unwrap().push(name.clone());
            if self.missing.contains(&name) {
                return Err(QueryError::UnknownTable(name));
            }
            return Ok(QueryResult::new(
                vec!["column_name".to_string(), "column_type".to_string()],
                vec![vec![json!(format!("{}_id", name)), json!("INTEGER")]],
            ));
        }

        if sql.contains("BOGUS") {
            return Err(QueryError::Invalid(sql.to_string()));
        }

        Ok(QueryResult::new(
            vec!["id".to_string(), "label".to_string()],
            vec![vec![json!(1), json!("first")], vec![json!(2), json!("second")]],
        ))
    }

    async fn export_store(&self) -> Result<ExportResult, QueryError> {
        self.exports.fetch_add(1, Ordering::SeqCst);
        if self.fail_export {
            return Err(QueryError::Task("record store offline".to_string()));
        }
        Ok(ExportResult {
            tables: self
                .exported
                .iter()
                .map(|(name, rows)| ExportedTable {
                    name: name.clone(),
                    row_count: *rows,
                })
                .collect(),
        })
    }
}

pub struct Harness {
    pub store: Arc<MemoryChatStore>,
    pub engine: Arc<ScriptedEngine>,
    pub audio: Arc<AudioQueue>,
    pub service: CommandService,
}

impl Harness {
    pub fn new(engine: ScriptedEngine) -> Self {
        Self::with_duck(engine, DuckCommand::new())
    }

    pub fn with_duck(engine: ScriptedEngine, duck: DuckCommand) -> Self {
        ensure_init();

        let store = Arc::new(MemoryChatStore::new());
        let engine = Arc::new(engine);
        let audio = Arc::new(AudioQueue::new());

        let mut service = CommandService::new(
            "/",
            Collaborators {
                store: store.clone(),
                engine: engine.clone(),
                audio: audio.clone(),
            },
        );
        service.register(HelpCommand::new()).unwrap();
        service.register(duck).unwrap();
        service.register(StopCommand::new()).unwrap();

        Self {
            store,
            engine,
            audio,
            service,
        }
    }

    pub fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }
}
