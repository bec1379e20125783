//! Reward scoring.
//!
//! Converts an agent's final answer, the expected answer, the number of
//! actions the agent took and the case's optimal action budget into a single
//! reward in `[0, 1]`:
//!
//! ```text
//! sim         = ratio(normalize(final), normalize(expected))
//! correctness = clamp((sim - 0.70) / 0.30, 0, 1)
//! efficiency  = 0.5 ^ (max(0, n_actions - optimal_actions) / 5)
//! reward      = round(correctness * efficiency, 6)
//! ```
//!
//! A wrong answer scores 0 however efficient the run was. A correct answer
//! within budget scores exactly its correctness; every five actions over
//! budget halve it.
//!
//! Scoring is a pure function. The only rejected input is `n_actions < 1`,
//! which means the caller never recorded the run's actions.

use crate::similarity;
use serde::{Deserialize, Serialize};
use sqlbench_core::Answer;
use thiserror::Error;

/// Similarity below which an answer earns no correctness credit.
pub const SIMILARITY_THRESHOLD: f64 = 0.70;

/// Width of the correctness ramp: full credit is reached at
/// `SIMILARITY_THRESHOLD + SIMILARITY_RAMP`.
///
/// Kept as its own literal because `1.0 - 0.70` is not `0.30` in binary
/// floating point.
pub const SIMILARITY_RAMP: f64 = 0.30;

/// Actions over budget that halve the efficiency score.
pub const EFFICIENCY_HALF_LIFE: f64 = 5.0;

/// Optimal action budget used when the caller has no case-specific value.
pub const DEFAULT_OPTIMAL_ACTIONS: u32 = 10;

/// Slack allowed when checking that a tuned ramp ends at similarity 1.
const RAMP_TOLERANCE: f64 = 1e-9;

/// Decimal places kept in the final reward.
pub const REWARD_DECIMALS: usize = 6;

/// Errors raised by reward scoring.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RewardError {
    /// The scoring request is malformed: a run always takes at least one action.
    #[error("Invalid input: n_actions must be >= 1, got {n_actions}")]
    InvalidInput { n_actions: i64 },

    /// A reward policy parameter is out of range.
    #[error("Invalid reward policy: {0}")]
    InvalidPolicy(String),
}

/// Everything needed to score one agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    /// The agent's final answer
    pub final_answer: Answer,
    /// Ground-truth answer
    pub expected_answer: String,
    /// Actions the agent actually executed
    pub n_actions: i64,
    /// Actions a maximally efficient agent needs
    #[serde(default = "default_optimal_actions")]
    pub optimal_actions: u32,
}

fn default_optimal_actions() -> u32 {
    DEFAULT_OPTIMAL_ACTIONS
}

impl ScoringInput {
    /// Create an input with the default optimal budget of
    /// [`DEFAULT_OPTIMAL_ACTIONS`].
    pub fn new(
        final_answer: impl Into<Answer>,
        expected_answer: impl Into<String>,
        n_actions: i64,
    ) -> Self {
        Self {
            final_answer: final_answer.into(),
            expected_answer: expected_answer.into(),
            n_actions,
            optimal_actions: DEFAULT_OPTIMAL_ACTIONS,
        }
    }

    /// Set the optimal action budget.
    #[must_use]
    pub fn with_optimal_actions(mut self, optimal_actions: u32) -> Self {
        self.optimal_actions = optimal_actions;
        self
    }
}

/// Intermediate values of one scoring call.
///
/// Only `reward` is rounded; the sub-scores are kept at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    /// Raw similarity ratio between the normalized answers
    pub similarity: f64,
    /// Similarity mapped through the threshold ramp
    pub correctness: f64,
    /// Decay factor for actions over budget
    pub efficiency: f64,
    /// Actions taken beyond the optimal budget
    pub extra_actions: u64,
    /// `correctness * efficiency`, rounded
    pub reward: f64,
}

/// Tunable reward calibration.
///
/// [`RewardPolicy::default`] is the reference calibration; adjust the fields
/// to recalibrate without touching the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    /// Similarity below which correctness is zero, in `[0, 1)`
    pub similarity_threshold: f64,
    /// Similarity span over which correctness climbs from 0 to 1, `> 0`,
    /// with `similarity_threshold + similarity_ramp <= 1`
    pub similarity_ramp: f64,
    /// Extra actions that halve efficiency, `> 0`
    pub half_life_actions: f64,
    /// Budget assumed by callers without a case-specific value
    pub default_optimal_actions: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            similarity_ramp: SIMILARITY_RAMP,
            half_life_actions: EFFICIENCY_HALF_LIFE,
            default_optimal_actions: DEFAULT_OPTIMAL_ACTIONS,
        }
    }
}

impl RewardPolicy {
    /// Move the threshold, ramping from it to full credit at similarity 1.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self.similarity_ramp = 1.0 - threshold;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<(), RewardError> {
        if !(0.0..1.0).contains(&self.similarity_threshold) {
            return Err(RewardError::InvalidPolicy(format!(
                "similarity_threshold ({}) must be in [0, 1)",
                self.similarity_threshold
            )));
        }
        if !(self.similarity_ramp.is_finite() && self.similarity_ramp > 0.0)
            || self.similarity_threshold + self.similarity_ramp > 1.0 + RAMP_TOLERANCE
        {
            return Err(RewardError::InvalidPolicy(format!(
                "similarity_ramp ({}) must be positive and end at or below similarity 1",
                self.similarity_ramp
            )));
        }
        if !(self.half_life_actions.is_finite() && self.half_life_actions > 0.0) {
            return Err(RewardError::InvalidPolicy(format!(
                "half_life_actions ({}) must be a positive number",
                self.half_life_actions
            )));
        }
        Ok(())
    }

    /// Per-action decay factor `γ = 0.5^(1 / half_life)`.
    pub fn decay_rate(&self) -> f64 {
        0.5_f64.powf(1.0 / self.half_life_actions)
    }

    /// Score a run, keeping the intermediate values.
    ///
    /// Fails on an out-of-range policy as well as on `n_actions < 1`.
    pub fn breakdown(&self, input: &ScoringInput) -> Result<RewardBreakdown, RewardError> {
        self.validate()?;
        if input.n_actions < 1 {
            return Err(RewardError::InvalidInput {
                n_actions: input.n_actions,
            });
        }

        let final_text = input.final_answer.to_string();
        let similarity = similarity::ratio(
            &normalize_answer(&final_text),
            &normalize_answer(&input.expected_answer),
        );
        let correctness = correctness(
            similarity,
            self.similarity_threshold,
            self.similarity_ramp,
        );

        let extra_actions = extra_actions(input.n_actions, input.optimal_actions);
        let efficiency = self.decay_rate().powf(extra_actions as f64);

        Ok(RewardBreakdown {
            similarity,
            correctness,
            efficiency,
            extra_actions,
            reward: round6(correctness * efficiency),
        })
    }

    /// Score a run.
    pub fn score(&self, input: &ScoringInput) -> Result<f64, RewardError> {
        self.breakdown(input).map(|b| b.reward)
    }
}

/// Trim and lowercase an answer for comparison.
pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Map a similarity ratio onto `[0, 1]` with a linear ramp from `threshold`
/// (no credit) to `threshold + ramp` (full credit).
pub fn correctness(similarity: f64, threshold: f64, ramp: f64) -> f64 {
    ((similarity - threshold) / ramp).clamp(0.0, 1.0)
}

/// Efficiency factor for a run of `n_actions` against a budget.
///
/// Exactly `1.0` at or under budget, halving every `half_life` extra actions.
pub fn efficiency(n_actions: i64, optimal_actions: u32, half_life: f64) -> f64 {
    let gamma = 0.5_f64.powf(1.0 / half_life);
    gamma.powf(extra_actions(n_actions, optimal_actions) as f64)
}

fn extra_actions(n_actions: i64, optimal_actions: u32) -> u64 {
    (n_actions - i64::from(optimal_actions)).max(0) as u64
}

/// Round to [`REWARD_DECIMALS`] decimal places.
///
/// Rounds the exact binary value, with ties going to the even digit, so
/// `round6(0.0078125)` is `0.007812`.
pub fn round6(value: f64) -> f64 {
    format!("{:.*}", REWARD_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Score a run with the reference calibration.
///
/// # Example
///
/// ```
/// use sqlbench_eval::reward::compute_reward;
///
/// assert_eq!(compute_reward("Arno Kumaresan", "Arno Kumaresan", 4, 4).unwrap(), 1.0);
/// assert_eq!(compute_reward("401", "401", 9, 4).unwrap(), 0.5);
/// assert_eq!(compute_reward("wrong", "Manton Leuchs", 4, 4).unwrap(), 0.0);
/// assert!(compute_reward("401", "401", 0, 4).is_err());
/// ```
pub fn compute_reward(
    final_answer: impl Into<Answer>,
    expected_answer: &str,
    n_actions: i64,
    optimal_actions: u32,
) -> Result<f64, RewardError> {
    let input = ScoringInput::new(final_answer, expected_answer, n_actions)
        .with_optimal_actions(optimal_actions);
    RewardPolicy::default().score(&input)
}

/// Score a run against the default budget of [`DEFAULT_OPTIMAL_ACTIONS`].
pub fn compute_reward_default_budget(
    final_answer: impl Into<Answer>,
    expected_answer: &str,
    n_actions: i64,
) -> Result<f64, RewardError> {
    compute_reward(
        final_answer,
        expected_answer,
        n_actions,
        DEFAULT_OPTIMAL_ACTIONS,
    )
}
