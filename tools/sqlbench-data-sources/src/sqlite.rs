//! SQLite schema introspection and query rendering.

use crate::error::SourceError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Message returned when a row-producing statement yields nothing.
pub const NO_RESULTS: &str = "Query executed successfully but returned no results.";

fn open(path: &Path) -> rusqlite::Result<Connection> {
    // Never create a database file as a side effect of a lookup
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

/// Render the `CREATE` statements of every table and view, ordered by name.
pub(crate) fn schema(name: &str, path: &Path) -> Result<String, SourceError> {
    let to_error = |error| SourceError::Schema {
        name: name.to_string(),
        path: path.to_path_buf(),
        error,
    };

    let conn = open(path).map_err(to_error)?;
    let tables = definitions(&conn, "table").map_err(to_error)?;
    let views = definitions(&conn, "view").map_err(to_error)?;

    let mut parts = Vec::new();
    if !tables.is_empty() {
        parts.push("-- Tables".to_string());
        parts.extend(tables.into_iter().map(|sql| sql + ";"));
    }
    if !views.is_empty() {
        parts.push("\n-- Views".to_string());
        parts.extend(views.into_iter().map(|sql| sql + ";"));
    }

    if parts.is_empty() {
        return Ok(format!(
            "Warning: SQLite database '{}' exists but contains no tables or views.",
            name
        ));
    }

    Ok(parts.join("\n"))
}

fn definitions(conn: &Connection, kind: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT sql FROM sqlite_master WHERE type = ?1 AND sql IS NOT NULL ORDER BY name",
    )?;
    let rows = stmt.query_map([kind], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Execute a single statement.
///
/// Statements that produce columns are rendered as a pipe-separated table
/// under a dashed rule; anything else reports the number of rows changed.
pub(crate) fn query(name: &str, path: &Path, sql: &str) -> Result<String, SourceError> {
    let to_error = |error| SourceError::Query {
        name: name.to_string(),
        error,
    };

    let conn = open(path).map_err(to_error)?;
    let mut stmt = conn.prepare(sql).map_err(to_error)?;

    if stmt.column_count() == 0 {
        let changed = stmt.execute([]).map_err(to_error)?;
        return Ok(format!(
            "Query executed successfully. Rows affected: {}",
            changed
        ));
    }

    let header = stmt.column_names().join(" | ");
    let column_count = stmt.column_count();

    let mut lines = Vec::new();
    let mut rows = stmt.query([]).map_err(to_error)?;
    while let Some(row) = rows.next().map_err(to_error)? {
        let mut cells = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            cells.push(render_value(row.get_ref(idx).map_err(to_error)?));
        }
        lines.push(cells.join(" | "));
    }

    if lines.is_empty() {
        return Ok(NO_RESULTS.to_string());
    }

    let rule = "-".repeat(header.chars().count());
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(header);
    out.push(rule);
    out.extend(lines);
    Ok(out.join("\n"))
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) if f.is_finite() => format!("{:?}", f),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<BLOB {} bytes>", bytes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(temp: &TempDir) -> std::path::PathBuf {
        let path = temp.path().join("hr.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT, salary REAL, dept TEXT);
             CREATE TABLE departments (name TEXT PRIMARY KEY);
             CREATE VIEW top_paid AS SELECT name FROM employees ORDER BY salary DESC LIMIT 1;
             INSERT INTO employees (name, salary, dept)
                 VALUES ('Arno Kumaresan', 120000.0, 'Sales');
             INSERT INTO employees (name, salary, dept) VALUES ('Manton Leuchs', 39265.5, NULL);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_schema_tables_then_views() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let schema = schema("hr", &path).unwrap();
        let lines: Vec<&str> = schema.lines().collect();

        assert_eq!(lines[0], "-- Tables");
        assert!(lines[1].starts_with("CREATE TABLE departments"));
        assert!(lines[2].starts_with("CREATE TABLE employees"));
        assert!(lines[2].ends_with(");"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "-- Views");
        assert!(lines[5].starts_with("CREATE VIEW top_paid"));
    }

    #[test]
    fn test_schema_empty_database() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.db");
        Connection::open(&path).unwrap();

        let schema = schema("empty", &path).unwrap();
        assert_eq!(
            schema,
            "Warning: SQLite database 'empty' exists but contains no tables or views."
        );
    }

    #[test]
    fn test_query_renders_table() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let sql = "SELECT name, salary, dept FROM employees ORDER BY id";
        let out = query("hr", &path, sql).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "name | salary | dept");
        assert_eq!(lines[1], "-".repeat("name | salary | dept".len()));
        assert_eq!(lines[2], "Arno Kumaresan | 120000.0 | Sales");
        assert_eq!(lines[3], "Manton Leuchs | 39265.5 | NULL");
    }

    #[test]
    fn test_query_aggregate() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let out = query("hr", &path, "SELECT COUNT(*) AS n FROM employees").unwrap();
        assert_eq!(out, "n\n-\n2");
    }

    #[test]
    fn test_query_cte_returns_rows() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let out = query(
            "hr",
            &path,
            "WITH s AS (SELECT MIN(salary) AS m FROM employees) SELECT m FROM s",
        )
        .unwrap();
        assert!(out.ends_with("39265.5"));
    }

    #[test]
    fn test_query_no_results() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let out = query("hr", &path, "SELECT name FROM employees WHERE salary < 0").unwrap();
        assert_eq!(out, NO_RESULTS);
    }

    #[test]
    fn test_query_rows_affected() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let out = query("hr", &path, "UPDATE employees SET dept = 'Sales'").unwrap();
        assert_eq!(out, "Query executed successfully. Rows affected: 2");
    }

    #[test]
    fn test_query_sqlite_error() {
        let temp = TempDir::new().unwrap();
        let path = fixture(&temp);

        let err = query("hr", &path, "SELECT * FROM nope").unwrap_err();
        assert!(matches!(err, SourceError::Query { .. }));
        assert!(err
            .to_string()
            .starts_with("Error: SQLite error when executing query on 'hr'."));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(ValueRef::Null), "NULL");
        assert_eq!(render_value(ValueRef::Integer(401)), "401");
        assert_eq!(render_value(ValueRef::Real(50000.0)), "50000.0");
        assert_eq!(render_value(ValueRef::Text(b"Sales")), "Sales");
        assert_eq!(render_value(ValueRef::Blob(&[1, 2, 3])), "<BLOB 3 bytes>");
    }
}
