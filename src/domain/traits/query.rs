//! Tabular query engine abstraction and its result values

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::application::errors::QueryError;

/// Embedded analytical engine queried with SQL text
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Run a query and collect the whole result
    async fn run_query(&self, sql: &str) -> Result<QueryResult, QueryError>;

    /// Copy the primary record store into the engine's tables
    async fn export_store(&self) -> Result<ExportResult, QueryError>;
}

/// Column names plus rows of JSON-typed cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as objects keyed by column name, in result order
    pub fn to_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Values of one column, or `None` if the column does not exist
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// Render as a markdown table
    pub fn to_markdown(&self) -> String {
        if self.columns.is_empty() {
            return "_No results_".to_string();
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format!("| {} |", self.columns.join(" | ")));
        lines.push(format!(
            "|{}|",
            self.columns.iter().map(|_| " --- ").collect::<Vec<_>>().join("|")
        ));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(format_cell).collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }
        lines.join("\n")
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.replace('|', "\\|").replace('\n', " "),
        other => other.to_string(),
    }
}

/// What an export copied into the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub tables: Vec<ExportedTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTable {
    pub name: String,
    pub row_count: u64,
}

impl ExportResult {
    /// Row count for `name`; tables outside the export count as empty
    pub fn row_count(&self, name: &str) -> u64 {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.row_count)
            .unwrap_or(0)
    }
}
