//! Error types for data-source access.
//!
//! The `Display` text of every variant starts with `Error:`; tools hand that
//! text to the agent as their result so it can correct itself.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving or reading a data source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// Name is empty or would escape the catalog root.
    #[error("Error: Invalid data source name '{0}'. Names must be a single directory name.")]
    InvalidName(String),

    /// No `info.json` for this data source.
    #[error(
        "Error: Data source '{name}' not found. The info.json file does not exist at path: {}",
        .path.display()
    )]
    NotFound { name: String, path: PathBuf },

    /// `info.json` exists but is not a JSON object.
    #[error(
        "Error: Invalid JSON format in info.json for data source '{name}'. \
         JSON decode error: {reason}"
    )]
    InvalidInfo { name: String, reason: String },

    /// `info.json` could not be read.
    #[error("Error: Could not read info.json for data source '{name}'. IO error: {error}")]
    Io {
        name: String,
        error: std::io::Error,
    },

    /// The data source is not a SQLite database.
    #[error("Error: Data source '{name}' is not a SQLite database. Type is: {kind}")]
    NotSqlite { name: String, kind: String },

    /// `info.json` has no `file` field.
    #[error(
        "Error: No database file specified in info.json for data source '{0}'. \
         Expected 'file' field is missing."
    )]
    MissingFile(String),

    /// The database file named in `info.json` does not exist.
    #[error("Error: SQLite database file not found at path: {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// SQLite failed while reading the schema.
    #[error(
        "Error: SQLite database error when accessing '{name}' at {}. SQLite error: {error}",
        .path.display()
    )]
    Schema {
        name: String,
        path: PathBuf,
        error: rusqlite::Error,
    },

    /// SQLite failed while running a query.
    #[error("Error: SQLite error when executing query on '{name}'. SQLite error: {error}")]
    Query {
        name: String,
        error: rusqlite::Error,
    },

    /// The query text was blank.
    #[error("Error: SQL query cannot be empty.")]
    EmptyQuery,
}
