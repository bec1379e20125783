//! Tool registry for managing available tools.

use super::{Tool, ToolError, ToolResult, ToolSet};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available tools.
///
/// The registry stores tool instances (not factories) since tools are
/// inherently stateless. Tools are stored as `Arc<dyn Tool>`, so a registry
/// can be shared by every concurrent agent run of an evaluation.
///
/// # Example
///
/// ```no_run
/// use sqlbench_core::tool::{ToolRegistry, ToolSet};
///
/// let registry = ToolRegistry::new();
///
/// for name in registry.list() {
///     println!("Available: {}", name);
/// }
///
/// let declarations = registry.declarations(&ToolSet::All);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool in the registry.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    /// Returns `&mut Self` for chaining.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
        self
    }

    /// Register a tool that's already wrapped in Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all registered tool names, sorted alphabetically.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Filter tools based on a [`ToolSet`] specification.
    pub fn filter(&self, tool_set: &ToolSet) -> Vec<Arc<dyn Tool>> {
        self.tools
            .iter()
            .filter(|(name, _)| tool_set.matches(name))
            .map(|(_, tool)| Arc::clone(tool))
            .collect()
    }

    /// Function declarations for the tools matching a filter, sorted by name.
    pub fn declarations(&self, tool_set: &ToolSet) -> Vec<Value> {
        let mut tools = self.filter(tool_set);
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools.iter().map(|tool| tool.to_declaration()).collect()
    }

    /// Look up a tool by name and execute it.
    ///
    /// Returns [`ToolError::NotFound`] if no tool with that name is registered.
    pub async fn call(&self, name: &str, input: Value) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(input).await
    }

    /// Get an iterator over all tools.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Tool>)> {
        self.tools.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug)]
    struct MockTool {
        name: String,
    }

    impl MockTool {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
            }
        }
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "A mock tool for testing"
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {}
            })
        }

        async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::new(format!("{} got {}", self.name, input)))
        }
    }

    #[test]
    fn test_registry_new() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("sqlite_query"));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("sqlite_query"));
        assert_eq!(registry.get("sqlite_query").unwrap().name(), "sqlite_query");
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_registry_list_sorted() {
        let mut registry = ToolRegistry::new();
        registry
            .register(MockTool::new("sqlite_query"))
            .register(MockTool::new("describe_data_source"))
            .register(MockTool::new("list_data_sources"));

        assert_eq!(
            registry.list(),
            vec!["describe_data_source", "list_data_sources", "sqlite_query"]
        );
    }

    #[test]
    fn test_registry_filter_specific() {
        let mut registry = ToolRegistry::new();
        registry
            .register(MockTool::new("a"))
            .register(MockTool::new("b"))
            .register(MockTool::new("c"));

        let filtered = registry.filter(&ToolSet::Specific(vec!["a".into(), "c".into()]));
        let names: Vec<&str> = filtered.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a"));
        assert!(names.contains(&"c"));
    }

    #[test]
    fn test_registry_replace_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("test"));
        registry.register(MockTool::new("test"));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_declarations_sorted() {
        let mut registry = ToolRegistry::new();
        registry
            .register(MockTool::new("zeta"))
            .register(MockTool::new("alpha"));

        let declarations = registry.declarations(&ToolSet::All);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0]["name"], "alpha");
        assert_eq!(declarations[1]["name"], "zeta");
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("echo"));

        let result = registry.call("echo", json!({"x": 1})).await.unwrap();
        assert!(result.content.starts_with("echo got"));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.call("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "missing"));
    }
}
