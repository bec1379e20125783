//! Per-run action counting.

use super::{ToolError, ToolRegistry, ToolResult, ToolSet};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// One tool invocation made during an agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ActionRecord {
    /// Name of the tool the agent asked for
    pub tool: String,
    /// Whether the call returned `Ok`
    pub succeeded: bool,
}

/// Routes an agent's tool calls to a shared registry and counts them.
///
/// One tracker is created per agent run. Every call is an action, including
/// calls that fail or name a tool outside the allowed [`ToolSet`]: the agent
/// spent a step on it either way.
///
/// # Example
///
/// ```
/// use sqlbench_core::tool::{ActionTracker, ToolRegistry};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let tracker = ActionTracker::new(Arc::new(ToolRegistry::new()));
/// let _ = tracker.call("list_data_sources", serde_json::json!({})).await;
/// assert_eq!(tracker.actions(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct ActionTracker {
    registry: Arc<ToolRegistry>,
    tool_set: ToolSet,
    records: Mutex<Vec<ActionRecord>>,
}

impl ActionTracker {
    /// Create a tracker exposing every tool in the registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_tool_set(registry, ToolSet::All)
    }

    /// Create a tracker exposing only the tools matched by `tool_set`.
    pub fn with_tool_set(registry: Arc<ToolRegistry>, tool_set: ToolSet) -> Self {
        Self {
            registry,
            tool_set,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Names of the tools this run may call, sorted.
    pub fn available_tools(&self) -> Vec<&str> {
        self.registry
            .list()
            .into_iter()
            .filter(|name| self.tool_set.matches(name))
            .collect()
    }

    /// Function declarations for the tools this run may call.
    pub fn declarations(&self) -> Vec<Value> {
        self.registry.declarations(&self.tool_set)
    }

    /// Invoke a tool by name, recording the call as one action.
    pub async fn call(&self, name: &str, input: Value) -> Result<ToolResult, ToolError> {
        let result = if self.tool_set.matches(name) {
            self.registry.call(name, input).await
        } else {
            Err(ToolError::NotFound(name.to_string()))
        };

        let succeeded = result.is_ok();
        let mut records = self.lock();
        records.push(ActionRecord {
            tool: name.to_string(),
            succeeded,
        });
        log::debug!(
            "Action {}: {} ({})",
            records.len(),
            name,
            if succeeded { "ok" } else { "failed" }
        );

        result
    }

    /// Number of tool calls made so far.
    pub fn actions(&self) -> usize {
        self.lock().len()
    }

    /// Copy of the calls made so far, in order.
    pub fn records(&self) -> Vec<ActionRecord> {
        self.lock().clone()
    }

    /// Recovers from a poisoned lock; the record list stays usable.
    fn lock(&self) -> MutexGuard<'_, Vec<ActionRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Action log lock was poisoned, recovering: {}", poisoned);
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::Tool;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug)]
    struct Flaky;

    #[async_trait]
    impl Tool for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn description(&self) -> &str {
            "Fails unless asked nicely"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"please": {"type": "boolean"}}})
        }

        async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
            if input["please"].as_bool() == Some(true) {
                Ok(ToolResult::new("done"))
            } else {
                Err(ToolError::ExecutionFailed("rude".into()))
            }
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        registry.register(Flaky);
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_counts_successes_and_failures() {
        let tracker = ActionTracker::new(registry());

        assert!(tracker.call("flaky", json!({"please": true})).await.is_ok());
        assert!(tracker.call("flaky", json!({})).await.is_err());

        assert_eq!(tracker.actions(), 2);
        let records = tracker.records();
        assert!(records[0].succeeded);
        assert!(!records[1].succeeded);
    }

    #[tokio::test]
    async fn test_unknown_tool_still_counts() {
        let tracker = ActionTracker::new(registry());

        let err = tracker.call("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert_eq!(tracker.actions(), 1);
    }

    #[tokio::test]
    async fn test_tool_set_restricts_calls() {
        let tracker = ActionTracker::with_tool_set(registry(), ToolSet::None);

        assert!(tracker.available_tools().is_empty());
        assert!(tracker.declarations().is_empty());

        let err = tracker
            .call("flaky", json!({"please": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
        assert_eq!(tracker.actions(), 1);
    }

    #[test]
    fn test_fresh_tracker_has_no_actions() {
        let tracker = ActionTracker::new(registry());
        assert_eq!(tracker.actions(), 0);
        assert_eq!(tracker.available_tools(), vec!["flaky"]);
    }
}
