//! [`Tool`] implementations over a [`DataSourceCatalog`].

use crate::catalog::DataSourceCatalog;
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlbench_core::tool::{required_str, Tool, ToolError, ToolResult};

/// Run blocking catalog work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ToolError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Blocking task failed: {}", e)))
}

fn name_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "data_source_name": {
                "type": "string",
                "description": "Name of the data source"
            }
        },
        "required": ["data_source_name"]
    })
}

/// Lists every available data source with its `info.json` fields.
#[derive(Debug, Clone, Default)]
pub struct ListDataSources {
    catalog: DataSourceCatalog,
}

impl ListDataSources {
    pub fn new(catalog: DataSourceCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for ListDataSources {
    fn name(&self) -> &str {
        "list_data_sources"
    }

    fn description(&self) -> &str {
        "List all available data sources. Returns a JSON array with the name, \
         type, description and other info of each data source."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value) -> Result<ToolResult, ToolError> {
        let catalog = self.catalog.clone();
        let sources = blocking(move || catalog.list()).await?;
        let count = sources.len();

        let content = serde_json::to_string_pretty(&sources)
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to encode sources: {}", e)))?;

        Ok(ToolResult::with_metadata(content, json!({ "count": count })))
    }
}

/// Returns the README of a data source.
#[derive(Debug, Clone, Default)]
pub struct DescribeDataSource {
    catalog: DataSourceCatalog,
}

impl DescribeDataSource {
    pub fn new(catalog: DataSourceCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for DescribeDataSource {
    fn name(&self) -> &str {
        "describe_data_source"
    }

    fn description(&self) -> &str {
        "Get the description of a given data source. It's mandatory to read it \
         before querying the data source. Returns an empty string if the data \
         source has no description."
    }

    fn parameters_schema(&self) -> Value {
        name_schema()
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let name = required_str(&input, "data_source_name")?.to_string();
        let catalog = self.catalog.clone();
        let readme = blocking(move || catalog.describe(&name)).await?;
        Ok(ToolResult::new(readme))
    }
}

/// Returns the table and view definitions of a SQLite data source.
#[derive(Debug, Clone, Default)]
pub struct SqliteGetSchema {
    catalog: DataSourceCatalog,
}

impl SqliteGetSchema {
    pub fn new(catalog: DataSourceCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SqliteGetSchema {
    fn name(&self) -> &str {
        "sqlite_get_schema"
    }

    fn description(&self) -> &str {
        "Get the database schema of a SQLite data source: the CREATE statements \
         of every table and view, or an error description."
    }

    fn parameters_schema(&self) -> Value {
        name_schema()
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let name = required_str(&input, "data_source_name")?.to_string();
        let catalog = self.catalog.clone();
        let schema = blocking(move || catalog.schema(&name)).await?;

        Ok(match schema {
            Ok(text) => ToolResult::new(text),
            Err(e) => ToolResult::with_metadata(e.to_string(), json!({ "error": true })),
        })
    }
}

/// Executes one SQL statement against a SQLite data source.
#[derive(Debug, Clone, Default)]
pub struct SqliteQuery {
    catalog: DataSourceCatalog,
}

impl SqliteQuery {
    pub fn new(catalog: DataSourceCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SqliteQuery {
    fn name(&self) -> &str {
        "sqlite_query"
    }

    fn description(&self) -> &str {
        "Execute a SQL query against a SQLite data source. Returns the result \
         rows as a pipe-separated table, a row count for statements that \
         return no rows, or an error description."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data_source_name": {
                    "type": "string",
                    "description": "Name of the data source"
                },
                "sql_query": {
                    "type": "string",
                    "description": "SQL query to execute"
                }
            },
            "required": ["data_source_name", "sql_query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let name = required_str(&input, "data_source_name")?.to_string();
        let sql = required_str(&input, "sql_query")?.to_string();
        let catalog = self.catalog.clone();
        let output = blocking(move || catalog.query(&name, &sql)).await?;

        Ok(match output {
            Ok(text) => ToolResult::new(text),
            Err(e) => {
                log::debug!("sqlite_query failed: {}", e);
                ToolResult::with_metadata(e.to_string(), json!({ "error": true }))
            }
        })
    }
}
