//! The agent seam.
//!
//! Deciding which tools to call is outside this workspace. Anything that can
//! answer a question using the tools handed to it implements [`Agent`] and
//! can be benchmarked by the evaluation harness.

use crate::answer::Answer;
use crate::error::AgentError;
use crate::tool::ActionTracker;
use async_trait::async_trait;

/// An agent that answers natural-language questions about data sources.
///
/// Tool calls must go through the supplied [`ActionTracker`]; that is how
/// the harness counts the actions a run took.
///
/// # Example
///
/// ```
/// use sqlbench_core::{Agent, AgentError, Answer};
/// use sqlbench_core::tool::ActionTracker;
/// use async_trait::async_trait;
///
/// struct Guesser;
///
/// #[async_trait]
/// impl Agent for Guesser {
///     fn name(&self) -> &str { "guesser" }
///     fn description(&self) -> &str { "Always answers 42" }
///     async fn answer(
///         &self,
///         _question: &str,
///         _tools: &ActionTracker,
///     ) -> Result<Answer, AgentError> {
///         Ok(Answer::from(42))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// Unique identifier for this agent type.
    fn name(&self) -> &str;

    /// Human-readable description of what this agent does.
    fn description(&self) -> &str;

    /// Work on `question` and return the final answer.
    async fn answer(&self, question: &str, tools: &ActionTracker) -> Result<Answer, AgentError>;
}
