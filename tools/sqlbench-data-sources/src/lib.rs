//! Data-source tools for sqlbench agents.
//!
//! Exposes a directory of named data sources to agents through four tools:
//!
//! | Tool | Input | Output |
//! |------|-------|--------|
//! | `list_data_sources` | none | JSON array of data-source info |
//! | `describe_data_source` | `data_source_name` | README text, or empty |
//! | `sqlite_get_schema` | `data_source_name` | table and view definitions |
//! | `sqlite_query` | `data_source_name`, `sql_query` | result table or row count |
//!
//! Problems with the data (unknown source, bad SQL) come back as result text
//! starting with `Error:` so an agent can read them and try again. Only
//! malformed tool input is a [`ToolError`](sqlbench_core::ToolError).
//!
//! # Example
//!
//! ```no_run
//! use sqlbench_core::ToolRegistry;
//! use sqlbench_data_sources::{register_tools, DataSourceCatalog};
//!
//! let mut registry = ToolRegistry::new();
//! register_tools(&mut registry, DataSourceCatalog::new("data_sources"));
//! assert_eq!(registry.len(), 4);
//! ```

pub mod catalog;
pub mod error;
mod sqlite;
pub mod tools;

pub use catalog::{DataSourceCatalog, DEFAULT_ROOT};
pub use error::SourceError;
pub use sqlite::NO_RESULTS;
pub use tools::{DescribeDataSource, ListDataSources, SqliteGetSchema, SqliteQuery};

use sqlbench_core::ToolRegistry;

/// Register all four data-source tools over `catalog`.
pub fn register_tools(
    registry: &mut ToolRegistry,
    catalog: DataSourceCatalog,
) -> &mut ToolRegistry {
    registry
        .register(ListDataSources::new(catalog.clone()))
        .register(DescribeDataSource::new(catalog.clone()))
        .register(SqliteGetSchema::new(catalog.clone()))
        .register(SqliteQuery::new(catalog))
}
