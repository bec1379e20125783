//! Evaluation results and summary types.
//!
//! This module contains the output types for evaluation runs,
//! designed for JSON serialization and programmatic consumption.

use crate::dataset::EvalCase;
use serde::{Deserialize, Serialize};
use sqlbench_core::Answer;
use std::collections::HashMap;

/// A finished agent run recorded elsewhere, ready to be graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedRun {
    /// The question the agent was asked; matched exactly against the case set
    pub question: String,

    /// The agent's final answer
    #[serde(alias = "answer")]
    pub final_answer: Answer,

    /// Actions the agent executed, including submitting the answer
    pub n_actions: i64,
}

/// Result of evaluating a single case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// The question that was asked
    pub question: String,

    /// Expected answer (None if the question matched no case)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_answer: Option<String>,

    /// Optimal action budget of the case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_actions: Option<u32>,

    /// Agent's final answer (None if the agent failed)
    pub final_answer: Option<Answer>,

    /// Actions the run took (None if the agent failed)
    pub n_actions: Option<i64>,

    /// Scores from each scorer (scorer_name -> score)
    pub scores: HashMap<String, f64>,

    /// Number of retry attempts made
    pub retries: usize,

    /// Error message if the case failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseResult {
    /// Create a successful result.
    pub fn success(
        case: &EvalCase,
        final_answer: Answer,
        n_actions: i64,
        scores: HashMap<String, f64>,
        retries: usize,
    ) -> Self {
        Self {
            question: case.question.clone(),
            expected_answer: Some(case.expected_answer.clone()),
            optimal_actions: Some(case.optimal_actions),
            final_answer: Some(final_answer),
            n_actions: Some(n_actions),
            scores,
            retries,
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(case: &EvalCase, error: String, retries: usize) -> Self {
        Self {
            question: case.question.clone(),
            expected_answer: Some(case.expected_answer.clone()),
            optimal_actions: Some(case.optimal_actions),
            final_answer: None,
            n_actions: None,
            scores: HashMap::new(),
            retries,
            error: Some(error),
        }
    }

    /// A recorded run whose question is not in the case set.
    pub fn unmatched(run: &RecordedRun) -> Self {
        Self {
            question: run.question.clone(),
            expected_answer: None,
            optimal_actions: None,
            final_answer: Some(run.final_answer.clone()),
            n_actions: Some(run.n_actions),
            scores: HashMap::new(),
            retries: 0,
            error: Some("Question does not match any evaluation case".to_string()),
        }
    }

    /// Whether this result represents a successful evaluation.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.final_answer.is_some()
    }

    /// The reward score, if the default reward scorer ran.
    pub fn reward(&self) -> Option<f64> {
        self.scores.get("reward").copied()
    }
}

/// Summary of an entire evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Name of the dataset used
    pub dataset_name: String,

    /// Name of the agent evaluated
    pub agent_name: String,

    /// Total number of cases evaluated
    pub total_cases: usize,

    /// Number of cases that succeeded
    pub succeeded: usize,

    /// Number of cases that failed
    pub failed: usize,

    /// Average score for each scorer across successful evaluations
    pub average_scores: HashMap<String, f64>,

    /// Mean score for each scorer over every case, failures scoring 0
    #[serde(default)]
    pub overall_scores: HashMap<String, f64>,

    /// Individual results for each case
    pub results: Vec<CaseResult>,

    /// Total actions across successful evaluations
    pub total_actions: u64,

    /// Total duration of the evaluation
    #[serde(with = "duration_serde")]
    pub total_duration: std::time::Duration,
}

impl EvalSummary {
    /// Create a summary from evaluation results.
    pub fn from_results(
        dataset_name: String,
        agent_name: String,
        results: Vec<CaseResult>,
        total_duration: std::time::Duration,
    ) -> Self {
        let total_cases = results.len();
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let failed = total_cases - succeeded;

        // Calculate average scores
        let mut score_sums: HashMap<String, (f64, usize)> = HashMap::new();
        for result in results.iter().filter(|r| r.is_success()) {
            for (scorer_name, score) in &result.scores {
                let entry = score_sums.entry(scorer_name.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }

        let overall_scores: HashMap<String, f64> = score_sums
            .iter()
            .map(|(name, (sum, _))| (name.clone(), sum / total_cases as f64))
            .collect();

        let average_scores: HashMap<String, f64> = score_sums
            .into_iter()
            .map(|(name, (sum, count))| {
                (name, if count > 0 { sum / count as f64 } else { 0.0 })
            })
            .collect();

        let total_actions: u64 = results
            .iter()
            .filter(|r| r.is_success())
            .filter_map(|r| r.n_actions)
            .map(|n| n.max(0) as u64)
            .sum();

        Self {
            dataset_name,
            agent_name,
            total_cases,
            succeeded,
            failed,
            average_scores,
            overall_scores,
            results,
            total_actions,
            total_duration,
        }
    }

    /// Average actions per successful case.
    pub fn average_actions(&self) -> f64 {
        if self.succeeded == 0 {
            0.0
        } else {
            self.total_actions as f64 / self.succeeded as f64
        }
    }

    /// Print a summary to stdout.
    pub fn print_summary(&self) {
        println!();
        println!("=== Evaluation Summary ===");
        println!("Dataset: {}", self.dataset_name);
        println!("Agent: {}", self.agent_name);
        println!();
        println!(
            "Cases: {} total, {} succeeded, {} failed",
            self.total_cases, self.succeeded, self.failed
        );
        println!(
            "Success rate: {:.1}%",
            if self.total_cases > 0 {
                (self.succeeded as f64 / self.total_cases as f64) * 100.0
            } else {
                0.0
            }
        );
        println!();

        if !self.average_scores.is_empty() {
            println!("Scores:");
            let mut scores: Vec<_> = self.average_scores.iter().collect();
            scores.sort_by(|a, b| a.0.cmp(b.0));
            for (scorer, avg) in scores {
                let overall = self.overall_scores.get(scorer).copied().unwrap_or(0.0);
                println!("  {}: {:.3} (answered), {:.3} (all cases)", scorer, avg, overall);
            }
            println!();
        }

        println!(
            "Actions: {} total, {:.1} per case",
            self.total_actions,
            self.average_actions()
        );
        println!("Duration: {:.1}s", self.total_duration.as_secs_f64());
    }

    /// Write the summary to a JSON file.
    pub fn write_json(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

/// Custom serde for Duration to serialize as seconds (f64).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
