//! SQLite-backed query engine
//!
//! Runs user SQL on an embedded SQLite connection and understands the
//! `SHOW TABLES` and `DESCRIBE <table>` shorthands. Exports copy every chat
//! session from the record source into the `chats` and `messages` tables.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::application::errors::QueryError;
use crate::domain::entities::ChatSession;
use crate::domain::traits::{ExportResult, ExportedTable, QueryEngine, QueryResult, RecordSource};

static SHOW_TABLES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*SHOW\s+TABLES\s*;?\s*$").expect("valid regex"));

static DESCRIBE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*(?:DESCRIBE|DESC)\s+(?:"((?:[^"]|"")+)"|([A-Za-z_][A-Za-z0-9_]*))\s*;?\s*$"#)
        .expect("valid regex")
});

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master
    WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
    ORDER BY name";

const DESCRIBE_SQL: &str = "SELECT name AS column_name,
        type AS column_type,
        CASE WHEN \"notnull\" THEN 'NO' ELSE 'YES' END AS \"null\",
        CASE WHEN pk > 0 THEN 'PRI' END AS \"key\",
        dflt_value AS \"default\"
    FROM pragma_table_info(?1)
    ORDER BY cid";

pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
    source: Arc<dyn RecordSource>,
}

impl SqliteEngine {
    pub fn open(path: impl AsRef<Path>, source: Arc<dyn RecordSource>) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        tracing::info!("Query engine opened at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            source,
        })
    }

    pub fn in_memory(source: Arc<dyn RecordSource>) -> Result<Self, QueryError> {
        Self::open(":memory:", source)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, QueryError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| QueryError::Task("connection lock poisoned".to_string()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| QueryError::Task(e.to_string()))?
    }
}

#[async_trait]
impl QueryEngine for SqliteEngine {
    async fn run_query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        let sql = sql.to_string();
        self.with_conn(move |conn| execute_sql(conn, &sql)).await
    }

    async fn export_store(&self) -> Result<ExportResult, QueryError> {
        let sessions = self.source.snapshot().await?;
        let result = self.with_conn(move |conn| write_export(conn, &sessions)).await?;
        tracing::info!(
            "Exported {} tables: {}",
            result.tables.len(),
            result
                .tables
                .iter()
                .map(|t| format!("{}={}", t.name, t.row_count))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(result)
    }
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<QueryResult, QueryError> {
    if sql.trim().is_empty() {
        return Err(QueryError::Invalid("empty query".to_string()));
    }

    if SHOW_TABLES.is_match(sql) {
        return select(conn, LIST_TABLES_SQL, &[]);
    }

    if let Some(caps) = DESCRIBE.captures(sql) {
        let table = match (caps.get(1), caps.get(2)) {
            (Some(quoted), _) => quoted.as_str().replace("\"\"", "\""),
            (None, Some(bare)) => bare.as_str().to_string(),
            (None, None) => return Err(QueryError::Invalid(sql.to_string())),
        };
        return describe(conn, &table);
    }

    select(conn, sql, &[])
}

fn describe(conn: &Connection, table: &str) -> Result<QueryResult, QueryError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(QueryError::UnknownTable(table.to_string()));
    }
    select(conn, DESCRIBE_SQL, &[&table as &dyn rusqlite::ToSql])
}

fn select(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<QueryResult, QueryError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            cells.push(to_json(row.get_ref(i)?));
        }
        out.push(cells);
    }

    Ok(QueryResult::new(columns, out))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}

fn write_export(conn: &mut Connection, sessions: &[ChatSession]) -> Result<ExportResult, QueryError> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "DROP TABLE IF EXISTS messages;
        DROP TABLE IF EXISTS chats;
        CREATE TABLE chats (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            message_count INTEGER NOT NULL
        );
        CREATE TABLE messages (
            id TEXT PRIMARY KEY,
            chat_id TEXT NOT NULL REFERENCES chats(id),
            seq INTEGER NOT NULL,
            role TEXT NOT NULL,
            text TEXT NOT NULL,
            author TEXT,
            created_at TEXT NOT NULL
        );",
    )?;

    let mut message_count = 0u64;
    {
        let mut insert_chat = tx.prepare(
            "INSERT INTO chats (id, created_at, message_count) VALUES (?1, ?2, ?3)",
        )?;
        let mut insert_message = tx.prepare(
            "INSERT INTO messages (id, chat_id, seq, role, text, author, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for session in sessions {
            insert_chat.execute(rusqlite::params![
                session.id(),
                session.created_at().to_rfc3339(),
                session.len() as i64,
            ])?;

            for (seq, message) in session.messages().iter().enumerate() {
                insert_message.execute(rusqlite::params![
                    message.id(),
                    session.id(),
                    seq as i64,
                    message.role().as_str(),
                    message.text(),
                    message.author().map(|u| u.id.as_str()),
                    message.timestamp().to_rfc3339(),
                ])?;
                message_count += 1;
            }
        }
    }

    tx.commit()?;

    Ok(ExportResult {
        tables: vec![
            ExportedTable {
                name: "chats".to_string(),
                row_count: sessions.len() as u64,
            },
            ExportedTable {
                name: "messages".to_string(),
                row_count: message_count,
            },
        ],
    })
}
