//! # Sqlbench Eval
//!
//! Reward scoring and evaluation for agents that answer questions about
//! tabular data sources.
//!
//! ## Overview
//!
//! - **Reward**: [`compute_reward`] blends answer correctness with action
//!   efficiency into a single score in `[0, 1]`
//! - **Cases**: the built-in [`CaseSet::employees`] benchmark or custom JSON files
//! - **Scorers**: [`Reward`], [`Correctness`] and [`Contains`] metrics
//! - **Harness**: batch execution with bounded concurrency, retries and
//!   per-run action counting; grading of pre-recorded runs
//! - **Results**: structured JSON output for analysis
//!
//! ## Architecture
//!
//! ```text
//! sqlbench-core (answers, tools, action tracking, agents)
//!     ↓
//! sqlbench-data-sources (data-source tools)
//!     ↓
//! sqlbench-eval (reward, case sets, scorers, harness)  ← this crate
//! ```
//!
//! ## Scoring a run
//!
//! ```
//! use sqlbench_eval::compute_reward;
//!
//! // Correct answer within its 4-action budget
//! assert_eq!(compute_reward("Arno Kumaresan", "Arno Kumaresan", 4, 4).unwrap(), 1.0);
//!
//! // Five actions over budget halve the reward
//! assert_eq!(compute_reward(401, "401", 9, 4).unwrap(), 0.5);
//! ```
//!
//! ## Grading recorded runs
//!
//! ```
//! use sqlbench_eval::{score_recorded, CaseSet, EvalSummary, RecordedRun, Scorers};
//! use std::time::Duration;
//!
//! let cases = CaseSet::employees();
//! let runs = vec![RecordedRun {
//!     question: cases.get(0).unwrap().question.clone(),
//!     final_answer: "Arno Kumaresan".into(),
//!     n_actions: 4,
//! }];
//!
//! let results = score_recorded(&cases, &runs, &Scorers::default());
//! let summary = EvalSummary::from_results(
//!     "employees".to_string(),
//!     "recorded".to_string(),
//!     results,
//!     Duration::ZERO,
//! );
//! assert_eq!(summary.succeeded, 1);
//! assert_eq!(summary.failed, 9);
//! ```

pub mod config;
pub mod dataset;
pub mod harness;
pub mod results;
pub mod reward;
pub mod scorer;
pub mod similarity;

// Re-export public API
pub use config::{ConfigError, ConfigLoader, SqlbenchConfig};
pub use dataset::{CaseSet, Dataset, DatasetError, EmployeesBenchmark, EvalCase, JsonFileDataset};
pub use harness::{
    load_runs, score_recorded, score_recorded_with_progress, EvalConfig, EvalError, EvalHarness,
    EvalProgress,
};
pub use results::{CaseResult, EvalSummary, RecordedRun};
pub use reward::{
    compute_reward, compute_reward_default_budget, RewardBreakdown, RewardError, RewardPolicy,
    ScoringInput, DEFAULT_OPTIMAL_ACTIONS, EFFICIENCY_HALF_LIFE, SIMILARITY_THRESHOLD,
};
pub use scorer::{Contains, Correctness, Reward, Scorer, Scorers};
