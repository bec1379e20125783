//! Data-source discovery on disk.
//!
//! A catalog is a directory with one sub-directory per data source:
//!
//! ```text
//! data_sources/
//! └── employees/
//!     ├── info.json      {"type": "SQLite", "file": "employees.db", ...}
//!     ├── README.md      optional human-readable description
//!     └── employees.db
//! ```

use crate::error::SourceError;
use crate::sqlite;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Default catalog directory, relative to the working directory.
pub const DEFAULT_ROOT: &str = "data_sources";

const INFO_FILE: &str = "info.json";
const README_FILE: &str = "README.md";
const SQLITE_TYPE: &str = "SQLite";

/// A directory of named data sources.
///
/// All methods are blocking; tools call them from `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct DataSourceCatalog {
    root: PathBuf,
}

impl Default for DataSourceCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

impl DataSourceCatalog {
    /// Create a catalog rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The catalog root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every data source with a readable `info.json`.
    ///
    /// Each entry is the info object with a `name` key holding the directory
    /// name, unless `info.json` sets `name` itself. Entries are sorted by
    /// directory name. A missing root yields an empty list.
    pub fn list(&self) -> Vec<Value> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Data source root {:?} not readable: {}", self.root, e);
                return Vec::new();
            }
        };

        let mut dirs: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();
        dirs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut sources = Vec::with_capacity(dirs.len());
        for (name, dir) in dirs {
            let info_path = dir.join(INFO_FILE);
            if !info_path.exists() {
                continue;
            }
            match read_info(&name, &info_path) {
                Ok(info) => {
                    let mut entry = Map::new();
                    entry.insert("name".to_string(), Value::String(name));
                    entry.extend(info);
                    sources.push(Value::Object(entry));
                }
                Err(e) => log::warn!("Skipping data source: {}", e),
            }
        }

        sources
    }

    /// The README of a data source, or an empty string if there is none.
    pub fn describe(&self, name: &str) -> String {
        let Ok(dir) = self.source_dir(name) else {
            return String::new();
        };
        std::fs::read_to_string(dir.join(README_FILE)).unwrap_or_default()
    }

    /// Load `info.json` for a data source.
    pub fn info(&self, name: &str) -> Result<Map<String, Value>, SourceError> {
        let info_path = self.source_dir(name)?.join(INFO_FILE);
        if !info_path.exists() {
            return Err(SourceError::NotFound {
                name: name.to_string(),
                path: info_path,
            });
        }
        read_info(name, &info_path)
    }

    /// Resolve the database file of a SQLite data source.
    pub fn sqlite_path(&self, name: &str) -> Result<PathBuf, SourceError> {
        let info = self.info(name)?;

        let kind = info.get("type").and_then(Value::as_str);
        if kind != Some(SQLITE_TYPE) {
            return Err(SourceError::NotSqlite {
                name: name.to_string(),
                kind: kind.unwrap_or("unknown").to_string(),
            });
        }

        let file = info
            .get("file")
            .and_then(Value::as_str)
            .filter(|file| !file.is_empty())
            .ok_or_else(|| SourceError::MissingFile(name.to_string()))?;

        let db_path = self.source_dir(name)?.join(file);
        if !db_path.exists() {
            return Err(SourceError::DatabaseNotFound(db_path));
        }

        Ok(db_path)
    }

    /// Schema text of a SQLite data source.
    pub fn schema(&self, name: &str) -> Result<String, SourceError> {
        let path = self.sqlite_path(name)?;
        sqlite::schema(name, &path)
    }

    /// Run one SQL statement against a SQLite data source.
    pub fn query(&self, name: &str, sql: &str) -> Result<String, SourceError> {
        let path = self.sqlite_path(name)?;
        if sql.trim().is_empty() {
            return Err(SourceError::EmptyQuery);
        }
        sqlite::query(name, &path, sql)
    }

    fn source_dir(&self, name: &str) -> Result<PathBuf, SourceError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(SourceError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn read_info(name: &str, path: &Path) -> Result<Map<String, Value>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|error| SourceError::Io {
        name: name.to_string(),
        error,
    })?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SourceError::InvalidInfo {
            name: name.to_string(),
            reason: format!("expected an object, found {}", json_kind(&other)),
        }),
        Err(e) => Err(SourceError::InvalidInfo {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
