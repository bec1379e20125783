//! Tool abstraction for agent actions.
//!
//! This module provides the core [`Tool`] trait and [`ToolRegistry`] for
//! managing the tools an agent may call while answering a question, plus the
//! [`ActionTracker`] that counts those calls for efficiency scoring.
//!
//! # Design
//!
//! - **Async execution**: Tools use async for I/O-bound operations (schema reads, queries)
//! - **Instance-based registry**: Tools are stateless, stored as instances not factories
//! - **Per-agent filtering**: [`ToolSet`] allows agents to specify which tools they need
//! - **Counted invocations**: every call routed through an [`ActionTracker`] is one action
//!
//! # Example
//!
//! ```
//! use sqlbench_core::tool::{Tool, ToolResult, ToolError, ToolRegistry};
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! #[async_trait]
//! impl Tool for Echo {
//!     fn name(&self) -> &str { "echo" }
//!     fn description(&self) -> &str { "Echoes its input" }
//!     fn parameters_schema(&self) -> Value {
//!         json!({
//!             "type": "object",
//!             "properties": {
//!                 "input": { "type": "string" }
//!             },
//!             "required": ["input"]
//!         })
//!     }
//!     async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
//!         let text = input["input"].as_str().unwrap_or("");
//!         Ok(ToolResult::new(text))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Echo);
//! assert!(registry.contains("echo"));
//! ```

mod registry;
mod tracker;

pub use registry::ToolRegistry;
pub use tracker::{ActionRecord, ActionTracker};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Result returned by a tool execution.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ToolResult {
    /// The main content/output from the tool.
    pub content: String,
    /// Optional structured metadata for observability/logging.
    pub metadata: Value,
}

impl ToolResult {
    /// Create a result with just content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Value::Null,
        }
    }

    /// Create a result with content and metadata.
    pub fn with_metadata(content: impl Into<String>, metadata: Value) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Errors that can occur during tool execution.
///
/// Data-level failures (unknown data source, bad SQL) are reported to the
/// agent as result content instead; these variants are for malformed calls
/// and failures of the tool machinery itself.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Invalid input provided to the tool.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tool execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool execution timed out.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// A tool that agents can invoke to perform actions.
///
/// Each tool has a unique name, description, and parameter schema that an
/// agent uses to decide when and how to invoke it.
#[async_trait]
pub trait Tool: Send + Sync + fmt::Debug {
    /// Unique identifier for this tool (e.g., "sqlite_query").
    fn name(&self) -> &str;

    /// Human-readable description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given input.
    ///
    /// The input is a JSON value matching the schema from
    /// [`parameters_schema`](Tool::parameters_schema).
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;

    /// Describe this tool as a function declaration.
    ///
    /// The default implementation builds `{name, description, parameters}`
    /// from the trait methods, the shape most function-calling APIs accept.
    fn to_declaration(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.parameters_schema(),
        })
    }
}

/// Extract a required string field from tool input.
///
/// Shared by tool implementations so missing or mistyped parameters produce
/// the same [`ToolError::InvalidInput`] message everywhere.
pub fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing '{}' field", field)))
}

/// Per-agent filtering specification for tools.
///
/// # Example
///
/// ```
/// use sqlbench_core::tool::ToolSet;
///
/// let all = ToolSet::All;
/// let none = ToolSet::None;
/// let specific = ToolSet::Specific(vec!["sqlite_query".into()]);
/// let except = ToolSet::Except(vec!["sqlite_query".into()]);
///
/// assert!(specific.matches("sqlite_query"));
/// assert!(!except.matches("sqlite_query"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolSet {
    /// Use all tools from registry.
    #[default]
    All,

    /// Use no tools.
    None,

    /// Use only the specified tools by name.
    Specific(Vec<String>),

    /// Use all tools except the specified ones.
    Except(Vec<String>),
}

impl ToolSet {
    /// Check if a tool name matches this filter.
    pub fn matches(&self, tool_name: &str) -> bool {
        match self {
            ToolSet::All => true,
            ToolSet::None => false,
            ToolSet::Specific(names) => names.iter().any(|n| n == tool_name),
            ToolSet::Except(names) => !names.iter().any(|n| n == tool_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named;

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            "named"
        }

        fn description(&self) -> &str {
            "A tool with a name"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _input: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::new(""))
        }
    }

    #[test]
    fn test_tool_result_new() {
        let result = ToolResult::new("hello");
        assert_eq!(result.content, "hello");
        assert_eq!(result.metadata, Value::Null);
    }

    #[test]
    fn test_tool_result_with_metadata() {
        let result = ToolResult::with_metadata("hello", json!({"rows": 3}));
        assert_eq!(result.content, "hello");
        assert_eq!(result.metadata["rows"], 3);
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(
            ToolError::InvalidInput("bad".into()).to_string(),
            "Invalid input: bad"
        );
        assert_eq!(
            ToolError::NotFound("foo".into()).to_string(),
            "Tool not found: foo"
        );
        assert_eq!(ToolError::Timeout(1000).to_string(), "Timeout after 1000ms");
    }

    #[test]
    fn test_to_declaration() {
        let decl = Named.to_declaration();
        assert_eq!(decl["name"], "named");
        assert_eq!(decl["description"], "A tool with a name");
        assert_eq!(decl["parameters"]["type"], "object");
    }

    #[test]
    fn test_required_str() {
        let input = json!({"data_source_name": "employees", "limit": 3});
        assert_eq!(
            required_str(&input, "data_source_name").unwrap(),
            "employees"
        );
        assert!(matches!(
            required_str(&input, "limit"),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(matches!(
            required_str(&input, "sql_query"),
            Err(ToolError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_toolset_filters() {
        assert!(ToolSet::All.matches("anything"));
        assert!(!ToolSet::None.matches("anything"));

        let specific = ToolSet::Specific(vec!["sqlite_query".into()]);
        assert!(specific.matches("sqlite_query"));
        assert!(!specific.matches("list_data_sources"));

        let except = ToolSet::Except(vec!["sqlite_query".into()]);
        assert!(!except.matches("sqlite_query"));
        assert!(except.matches("list_data_sources"));

        assert_eq!(ToolSet::default(), ToolSet::All);
    }
}
