//! Scoring metrics for evaluation.
//!
//! Provides the [`Scorer`] trait and built-in implementations. [`Reward`] is
//! the headline metric; [`Correctness`] and [`Contains`] help diagnose why a
//! run scored the way it did.

use crate::reward::{self, RewardError, RewardPolicy, ScoringInput};
use std::collections::HashMap;

/// Trait for evaluation scorers.
///
/// A scorer grades one agent run and returns a score between 0.0 and 1.0.
/// Scorers reject malformed input (a run without actions) instead of
/// scoring it.
///
/// # Example
///
/// ```
/// use sqlbench_eval::{RewardError, Scorer, ScoringInput};
///
/// struct WithinBudget;
///
/// impl Scorer for WithinBudget {
///     fn name(&self) -> &str {
///         "within_budget"
///     }
///
///     fn score(&self, input: &ScoringInput) -> Result<f64, RewardError> {
///         let within = input.n_actions <= i64::from(input.optimal_actions);
///         Ok(if within { 1.0 } else { 0.0 })
///     }
/// }
/// ```
pub trait Scorer: Send + Sync {
    /// The name of this scorer (used in reports).
    fn name(&self) -> &str;

    /// Score one run.
    fn score(&self, input: &ScoringInput) -> Result<f64, RewardError>;
}

/// The reward metric: correctness scaled by action efficiency.
///
/// # Example
///
/// ```
/// use sqlbench_eval::{Reward, Scorer, ScoringInput};
///
/// let input = ScoringInput::new("401", "401", 9).with_optimal_actions(4);
/// assert_eq!(Reward::default().score(&input).unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Reward {
    policy: RewardPolicy,
}

impl Reward {
    /// Create a reward scorer with a tuned policy.
    pub fn new(policy: RewardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }
}

impl Scorer for Reward {
    fn name(&self) -> &str {
        "reward"
    }

    fn score(&self, input: &ScoringInput) -> Result<f64, RewardError> {
        self.policy.score(input)
    }
}

/// Answer correctness alone, ignoring how many actions the run took.
#[derive(Debug, Clone, Copy, Default)]
pub struct Correctness {
    policy: RewardPolicy,
}

impl Correctness {
    pub fn new(policy: RewardPolicy) -> Self {
        Self { policy }
    }
}

impl Scorer for Correctness {
    fn name(&self) -> &str {
        "correctness"
    }

    fn score(&self, input: &ScoringInput) -> Result<f64, RewardError> {
        let breakdown = self.policy.breakdown(input)?;
        Ok(reward::round6(breakdown.correctness))
    }
}

/// Contains scorer.
///
/// Returns 1.0 if the normalized expected answer is contained within the
/// normalized final answer, 0.0 otherwise. Useful for spotting runs that
/// found the right value but wrapped it in extra text.
///
/// # Example
///
/// ```
/// use sqlbench_eval::{Contains, Scorer, ScoringInput};
///
/// let scorer = Contains;
///
/// let verbose = ScoringInput::new("The answer is Sales.", "Sales", 4);
/// assert_eq!(scorer.score(&verbose).unwrap(), 1.0);
///
/// let wrong = ScoringInput::new("Development", "Sales", 4);
/// assert_eq!(scorer.score(&wrong).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Contains;

impl Scorer for Contains {
    fn name(&self) -> &str {
        "contains"
    }

    fn score(&self, input: &ScoringInput) -> Result<f64, RewardError> {
        if input.n_actions < 1 {
            return Err(RewardError::InvalidInput {
                n_actions: input.n_actions,
            });
        }

        let predicted = normalize(&input.final_answer.to_string());
        let expected = normalize(&input.expected_answer);

        Ok(if predicted.contains(&expected) { 1.0 } else { 0.0 })
    }
}

/// Lowercase, trim and collapse runs of whitespace.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A collection of scorers for batch evaluation.
///
/// # Example
///
/// ```
/// use sqlbench_eval::{Contains, Correctness, Reward, Scorers};
///
/// let scorers = Scorers::default(); // Reward only
///
/// // Or custom set
/// let scorers = Scorers::new(vec![
///     Box::new(Reward::default()),
///     Box::new(Correctness::default()),
///     Box::new(Contains),
/// ]);
/// assert_eq!(scorers.names(), vec!["reward", "correctness", "contains"]);
/// ```
pub struct Scorers {
    scorers: Vec<Box<dyn Scorer>>,
}

impl Scorers {
    /// Create a new collection of scorers.
    pub fn new(scorers: Vec<Box<dyn Scorer>>) -> Self {
        Self { scorers }
    }

    /// Every built-in scorer, sharing one policy.
    pub fn all(policy: RewardPolicy) -> Self {
        Self::new(vec![
            Box::new(Reward::new(policy)),
            Box::new(Correctness::new(policy)),
            Box::new(Contains),
        ])
    }

    /// Add a scorer to the collection.
    pub fn add(&mut self, scorer: impl Scorer + 'static) {
        self.scorers.push(Box::new(scorer));
    }

    /// Score a run using all scorers.
    ///
    /// Returns a map of scorer_name -> score, or the first error.
    pub fn score_all(&self, input: &ScoringInput) -> Result<HashMap<String, f64>, RewardError> {
        self.scorers
            .iter()
            .map(|s| Ok((s.name().to_string(), s.score(input)?)))
            .collect()
    }

    /// Get the names of all scorers.
    pub fn names(&self) -> Vec<&str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

impl Default for Scorers {
    /// Default scorers: Reward only.
    fn default() -> Self {
        Self::new(vec![Box::new(Reward::default())])
    }
}

impl std::fmt::Debug for Scorers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorers")
            .field("scorers", &self.names())
            .finish()
    }
}
