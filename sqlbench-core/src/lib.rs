//! # Sqlbench Core
//!
//! Shared abstractions for benchmarking agents that answer questions about
//! tabular data sources.
//!
//! ## Architecture
//!
//! ```text
//! sqlbench-core (answers, tools, action tracking, agents)  ← this crate
//!     ↓
//! sqlbench-data-sources (data-source tools)
//!     ↓
//! sqlbench-eval (reward scoring, case sets, harness)
//! ```
//!
//! - [`Answer`]: an agent's final answer, text or numeric
//! - [`tool`]: the [`Tool`](tool::Tool) trait, registry, and the
//!   [`ActionTracker`](tool::ActionTracker) that counts actions per run
//! - [`Agent`]: anything that answers a question using tracked tools

pub mod agent;
pub mod answer;
pub mod error;
pub mod tool;

// Re-export public API
pub use agent::Agent;
pub use answer::Answer;
pub use error::AgentError;
pub use tool::{ActionRecord, ActionTracker, Tool, ToolError, ToolRegistry, ToolResult, ToolSet};
