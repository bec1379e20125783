//! Evaluation harness for batch execution.
//!
//! The [`EvalHarness`] orchestrates running an agent against a case set,
//! counting the actions each run takes, managing concurrency and retries,
//! and aggregating scored results. [`score_recorded`] grades runs that were
//! executed elsewhere.

use crate::dataset::{CaseSet, Dataset, DatasetError, EvalCase};
use crate::results::{CaseResult, EvalSummary, RecordedRun};
use crate::reward::ScoringInput;
use crate::scorer::Scorers;
use futures_util::stream::{self, StreamExt};
use sqlbench_core::{ActionTracker, Agent, AgentError, Answer, ToolRegistry, ToolSet};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Failed to load dataset
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Failed to read a recorded-runs file
    #[error("Failed to read runs: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a recorded-runs file
    #[error("Failed to parse runs: {0}")]
    Parse(String),
}

/// Progress events emitted during evaluation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EvalProgress {
    /// Cases loaded, evaluation starting.
    Started {
        /// Total number of cases to evaluate.
        total: usize,
    },
    /// A case evaluation completed (success or failure).
    CaseCompleted {
        /// Number of cases completed so far.
        completed: usize,
        /// Total number of cases.
        total: usize,
        /// Whether this case succeeded.
        success: bool,
    },
}

/// Configuration for the evaluation harness.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EvalConfig {
    /// Maximum number of concurrent evaluations (default: 5)
    pub concurrency: usize,

    /// Maximum retry attempts for failed cases (default: 1).
    ///
    /// This is the number of *additional* attempts after the initial try.
    /// For example, `max_retries = 1` means each case gets up to 2 total
    /// attempts (1 initial + 1 retry). `max_retries = 0` means no retries.
    /// Only retriable agent errors are retried.
    pub max_retries: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_retries: 1,
        }
    }
}

impl EvalConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency limit.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1); // At least 1
        self
    }

    /// Set the maximum retry count.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Evaluation harness for benchmarking agents.
///
/// Each attempt gets a fresh [`ActionTracker`] over the harness's tool
/// registry. The run's action count is the number of tool calls made
/// through the tracker plus one for submitting the final answer, so every
/// completed run has at least one action.
///
/// # Example
///
/// ```no_run
/// use sqlbench_data_sources::{register_tools, DataSourceCatalog};
/// use sqlbench_eval::{EmployeesBenchmark, EvalConfig, EvalHarness, Scorers};
/// use sqlbench_core::{Agent, ToolRegistry};
///
/// # async fn example(agent: &dyn Agent) -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = ToolRegistry::new();
/// register_tools(&mut registry, DataSourceCatalog::default());
///
/// let harness = EvalHarness::new(EvalConfig::default()).with_tools(registry);
/// let summary = harness
///     .evaluate(agent, &EmployeesBenchmark, None, Scorers::default())
///     .await?;
///
/// summary.print_summary();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EvalHarness {
    config: EvalConfig,
    tools: Arc<ToolRegistry>,
    tool_set: ToolSet,
}

impl EvalHarness {
    /// Create a new evaluation harness with no tools.
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            tools: Arc::new(ToolRegistry::new()),
            tool_set: ToolSet::All,
        }
    }

    /// Give agents access to the tools in `registry`.
    #[must_use]
    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.tools = Arc::new(registry);
        self
    }

    /// Restrict which registered tools agents may call.
    #[must_use]
    pub fn with_tool_set(mut self, tool_set: ToolSet) -> Self {
        self.tool_set = tool_set;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run evaluation against a dataset.
    ///
    /// # Arguments
    ///
    /// * `agent` - The agent to evaluate
    /// * `dataset` - The dataset to use
    /// * `sample_size` - Optional limit on cases to evaluate
    /// * `scorers` - Scoring metrics to apply
    ///
    /// # Returns
    ///
    /// An `EvalSummary` with aggregated results and per-case details.
    pub async fn evaluate<D>(
        &self,
        agent: &dyn Agent,
        dataset: &D,
        sample_size: Option<usize>,
        scorers: Scorers,
    ) -> Result<EvalSummary, EvalError>
    where
        D: Dataset,
    {
        self.evaluate_with_progress(agent, dataset, sample_size, scorers, |_| {})
            .await
    }

    /// Run evaluation with progress callbacks.
    ///
    /// Same as [`evaluate`](Self::evaluate), but calls the provided callback
    /// with progress events as the evaluation proceeds.
    pub async fn evaluate_with_progress<D, F>(
        &self,
        agent: &dyn Agent,
        dataset: &D,
        sample_size: Option<usize>,
        scorers: Scorers,
        on_progress: F,
    ) -> Result<EvalSummary, EvalError>
    where
        D: Dataset,
        F: Fn(EvalProgress) + Send + Sync,
    {
        let start_time = Instant::now();

        let cases = dataset.load(sample_size).await?;
        let total_cases = cases.len();

        on_progress(EvalProgress::Started { total: total_cases });

        log::info!(
            "Evaluating {} cases from '{}' with concurrency {}",
            total_cases,
            dataset.name(),
            self.config.concurrency
        );

        let completed = AtomicUsize::new(0);
        let scorers = &scorers;
        let completed = &completed;
        let on_progress = &on_progress;

        // Process cases with bounded concurrency
        let results: Vec<CaseResult> = stream::iter(cases.iter())
            .map(|case| async move {
                let result = self.evaluate_case(agent, case, scorers).await;
                let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                on_progress(EvalProgress::CaseCompleted {
                    completed: count,
                    total: total_cases,
                    success: result.is_success(),
                });
                result
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        Ok(EvalSummary::from_results(
            dataset.name().to_string(),
            agent.name().to_string(),
            results,
            start_time.elapsed(),
        ))
    }

    /// Evaluate a single case with retries.
    async fn evaluate_case(
        &self,
        agent: &dyn Agent,
        case: &EvalCase,
        scorers: &Scorers,
    ) -> CaseResult {
        let max_retries = self.config.max_retries;
        let mut last_error = String::new();
        let mut retries = 0;

        while retries <= max_retries {
            let tracker = ActionTracker::with_tool_set(self.tools.clone(), self.tool_set.clone());

            match agent.answer(&case.question, &tracker).await {
                Ok(answer) => {
                    // Submitting the final answer is itself an action
                    let n_actions = tracker.actions() as i64 + 1;
                    return score_case(case, answer, n_actions, scorers, retries);
                }
                Err(e) => {
                    last_error = format_agent_error(&e);
                    log::warn!(
                        "Case '{}' attempt {}/{} failed after {} actions: {}",
                        case.question,
                        retries + 1,
                        max_retries + 1,
                        tracker.actions(),
                        last_error
                    );
                    if !e.is_retriable() {
                        return CaseResult::failure(case, last_error, retries);
                    }
                }
            }

            retries += 1;
        }

        CaseResult::failure(case, last_error, retries.saturating_sub(1))
    }
}

impl Default for EvalHarness {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

fn score_case(
    case: &EvalCase,
    answer: Answer,
    n_actions: i64,
    scorers: &Scorers,
    retries: usize,
) -> CaseResult {
    let input = ScoringInput::new(answer.clone(), case.expected_answer.clone(), n_actions)
        .with_optimal_actions(case.optimal_actions);

    match scorers.score_all(&input) {
        Ok(scores) => {
            log::debug!(
                "Case '{}': answer '{}' in {} actions scored {:?}",
                case.question,
                answer,
                n_actions,
                scores
            );
            CaseResult::success(case, answer, n_actions, scores, retries)
        }
        Err(e) => {
            let mut result = CaseResult::failure(case, e.to_string(), retries);
            result.final_answer = Some(answer);
            result.n_actions = Some(n_actions);
            result
        }
    }
}

/// Format an AgentError for reports.
fn format_agent_error(e: &AgentError) -> String {
    match e {
        AgentError::Timeout {
            elapsed_ms,
            timeout_ms,
        } => format!("Timeout ({}ms / {}ms limit)", elapsed_ms, timeout_ms),
        AgentError::InvalidConfig(msg) => format!("Invalid config: {}", msg),
        _ => format!("{}", e),
    }
}

/// Grade runs that were executed elsewhere.
///
/// Each run is matched to a case by its exact question text. Runs that match
/// no case, runs with an invalid action count and cases without a run are
/// all reported as failures. Results follow the order of `runs`, then the
/// unanswered cases in case-set order.
pub fn score_recorded(
    cases: &CaseSet,
    runs: &[RecordedRun],
    scorers: &Scorers,
) -> Vec<CaseResult> {
    score_recorded_with_progress(cases, runs, scorers, |_| {})
}

/// Same as [`score_recorded`], reporting progress per result.
pub fn score_recorded_with_progress<F>(
    cases: &CaseSet,
    runs: &[RecordedRun],
    scorers: &Scorers,
    on_progress: F,
) -> Vec<CaseResult>
where
    F: Fn(EvalProgress),
{
    let answered: HashSet<&str> = runs.iter().map(|run| run.question.as_str()).collect();
    let unanswered: Vec<&EvalCase> = cases
        .iter()
        .filter(|case| !answered.contains(case.question.as_str()))
        .collect();

    let total = runs.len() + unanswered.len();
    on_progress(EvalProgress::Started { total });

    let mut results = Vec::with_capacity(total);
    let mut record = |result: CaseResult| {
        let success = result.is_success();
        results.push(result);
        on_progress(EvalProgress::CaseCompleted {
            completed: results.len(),
            total,
            success,
        });
    };

    for run in runs {
        let result = match cases.find_by_question(&run.question) {
            Some(case) => score_case(case, run.final_answer.clone(), run.n_actions, scorers, 0),
            None => {
                log::warn!("Recorded run matches no case: '{}'", run.question);
                CaseResult::unmatched(run)
            }
        };
        record(result);
    }

    for case in unanswered {
        record(CaseResult::failure(case, "No recorded run".to_string(), 0));
    }

    results
}

/// Load recorded runs from a JSON array file.
pub async fn load_runs(path: &Path) -> Result<Vec<RecordedRun>, EvalError> {
    let content = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&content).map_err(|e| EvalError::Parse(e.to_string()))
}
