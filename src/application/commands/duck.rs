//! `/duck` - run SQL against the embedded query engine

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::CommandContext;
use crate::application::errors::{CommandError, QueryError};
use crate::domain::entities::{ChatMessage, ChatSession, CommandInfo, User};
use crate::domain::traits::{ExportResult, QueryEngine, QueryResult};

const TABLES_HEADER: &str = "## Query Engine Tables";
const SHOW_TABLES: &str = "SHOW TABLES";

/// When the record store gets re-exported into the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportPolicy {
    /// Before every invocation
    #[default]
    Always,
    /// Reused until the chat store records another write
    PerTurn,
}

struct CachedExport {
    generation: u64,
    result: ExportResult,
}

pub struct DuckCommand {
    info: CommandInfo,
    policy: ExportPolicy,
    cache: Mutex<Option<CachedExport>>,
}

impl DuckCommand {
    pub fn new() -> Self {
        Self {
            info: CommandInfo::new("duck", "/duck", "Do some SQL queries")
                .with_usage("/duck [sql]"),
            policy: ExportPolicy::default(),
            cache: Mutex::new(None),
        }
    }

    pub fn with_policy(mut self, policy: ExportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn info(&self) -> &CommandInfo {
        &self.info
    }

    pub async fn execute(
        &self,
        ctx: CommandContext<'_>,
        session: &ChatSession,
        acting_user: Option<&User>,
        args: &[String],
    ) -> Result<ChatSession, CommandError> {
        let export = self.export(ctx).await?;

        let text = if args.is_empty() {
            describe_tables(ctx.engine, &export).await?
        } else {
            let sql = args.join(" ");
            tracing::debug!("Running query: {}", sql);
            let result = ctx.engine.run_query(&sql).await.map_err(CommandError::Query)?;
            format_query(&sql, &result)
        };

        let message = ChatMessage::human(text).with_author(acting_user);
        Ok(ctx.store.append_message(session, message).await?)
    }

    async fn export(&self, ctx: CommandContext<'_>) -> Result<ExportResult, CommandError> {
        if self.policy == ExportPolicy::Always {
            return ctx.engine.export_store().await.map_err(CommandError::Export);
        }

        let mut cache = self.cache.lock().await;
        // Read before exporting so a racing write forces the next export.
        let generation = ctx.store.generation().await?;
        if let Some(cached) = cache.as_ref() {
            if cached.generation == generation {
                tracing::debug!("Reusing export at store generation {}", generation);
                return Ok(cached.result.clone());
            }
        }

        let result = ctx.engine.export_store().await.map_err(CommandError::Export)?;
        *cache = Some(CachedExport {
            generation,
            result: result.clone(),
        });
        Ok(result)
    }
}

impl Default for DuckCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// One section per table, in the order the engine lists them.
async fn describe_tables(
    engine: &dyn QueryEngine,
    export: &ExportResult,
) -> Result<String, CommandError> {
    let tables = engine.run_query(SHOW_TABLES).await.map_err(CommandError::Query)?;
    let names = table_names(&tables)?;

    let descriptions = try_join_all(names.iter().map(|name| async move {
        engine
            .run_query(&format!("DESCRIBE {}", quote_ident(name)))
            .await
            .map(|result| result.to_markdown())
            .map_err(|source| CommandError::Lookup {
                table: name.clone(),
                source,
            })
    }))
    .await?;

    let mut parts = vec![TABLES_HEADER.to_string()];
    for (name, description) in names.iter().zip(descriptions) {
        parts.push(format!("### {} ({} rows)", name, export.row_count(name)));
        parts.push(description);
    }
    Ok(parts.join("\n\n"))
}

fn table_names(tables: &QueryResult) -> Result<Vec<String>, CommandError> {
    let column = tables.column("name").ok_or_else(|| {
        CommandError::Query(QueryError::Invalid(
            "table listing has no name column".to_string(),
        ))
    })?;

    Ok(column
        .into_iter()
        .map(|value| match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        })
        .collect())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn format_query(sql: &str, result: &QueryResult) -> String {
    ["```sql", sql, "```", &result.to_markdown()].join("\n\n")
}
