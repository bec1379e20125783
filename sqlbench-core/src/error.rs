use crate::tool::ToolError;
use thiserror::Error;

/// Errors that can occur while an agent works on a question.
///
/// A wrong answer is not an error: it is returned normally and scored low.
/// These variants mean the run produced no answer at all.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AgentError {
    /// A tool call failed in a way the agent could not recover from
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// The agent stopped without producing a final answer
    #[error("Agent finished without an answer: {0}")]
    NoAnswer(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Agent execution timed out
    #[error("Timeout after {elapsed_ms}ms (limit: {timeout_ms}ms)")]
    Timeout { elapsed_ms: u64, timeout_ms: u64 },

    /// Other agent-specific error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if this error is retriable (transient failures).
    ///
    /// # Example
    ///
    /// ```
    /// use sqlbench_core::AgentError;
    ///
    /// let timeout = AgentError::Timeout {
    ///     elapsed_ms: 5000,
    ///     timeout_ms: 3000,
    /// };
    /// assert!(timeout.is_retriable());
    /// assert!(!AgentError::InvalidConfig("bad".into()).is_retriable());
    /// ```
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            AgentError::Timeout { .. }
                | AgentError::Tool(ToolError::Timeout(_))
                | AgentError::NoAnswer(_)
                | AgentError::Other(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::Timeout {
            elapsed_ms: 1500,
            timeout_ms: 1000,
        };
        assert_eq!(err.to_string(), "Timeout after 1500ms (limit: 1000ms)");

        let err = AgentError::from(ToolError::NotFound("sqlite_query".into()));
        assert_eq!(err.to_string(), "Tool error: Tool not found: sqlite_query");
    }

    #[test]
    fn test_retriable() {
        assert!(AgentError::Tool(ToolError::Timeout(10)).is_retriable());
        assert!(AgentError::NoAnswer("gave up".into()).is_retriable());
        assert!(!AgentError::Tool(ToolError::InvalidInput("x".into())).is_retriable());
    }
}
