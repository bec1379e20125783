//! `sqlbench.toml` configuration.
//!
//! Two files are discovered and merged, later ones overriding earlier ones
//! field by field:
//!
//! 1. `~/.sqlbench/config.toml` (user-global)
//! 2. `./sqlbench.toml` (project-local)
//!
//! ```toml
//! [reward]
//! similarity_threshold = 0.70
//! similarity_ramp = 0.30
//! half_life_actions = 5.0
//! default_optimal_actions = 10
//!
//! [harness]
//! concurrency = 5
//! max_retries = 1
//!
//! [data_sources]
//! root = "data_sources"
//! ```

use crate::harness::EvalConfig;
use crate::reward::{RewardError, RewardPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Failed to read {}: {error}", .path.display())]
    Io { path: PathBuf, error: String },

    /// Parse error in config file
    #[error("Failed to parse {}: {error}", .path.display())]
    Parse { path: PathBuf, error: String },

    /// Values parsed but out of range
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] RewardError),
}

/// Root configuration structure for the sqlbench.toml file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct SqlbenchConfig {
    /// Reward calibration
    pub reward: Option<RewardToml>,

    /// Harness concurrency and retries
    pub harness: Option<HarnessToml>,

    /// Data-source catalog location
    pub data_sources: Option<DataSourcesToml>,
}

impl SqlbenchConfig {
    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: SqlbenchConfig) {
        if let Some(reward) = other.reward {
            match &mut self.reward {
                Some(existing) => existing.merge(reward),
                None => self.reward = Some(reward),
            }
        }
        if let Some(harness) = other.harness {
            match &mut self.harness {
                Some(existing) => existing.merge(harness),
                None => self.harness = Some(harness),
            }
        }
        if let Some(sources) = other.data_sources {
            match &mut self.data_sources {
                Some(existing) => existing.merge(sources),
                None => self.data_sources = Some(sources),
            }
        }
    }

    /// Check if this config is empty (all sections are None).
    pub fn is_empty(&self) -> bool {
        self.reward.is_none() && self.harness.is_none() && self.data_sources.is_none()
    }

    /// The reward policy, validated.
    pub fn reward_policy(&self) -> Result<RewardPolicy, ConfigError> {
        let policy = self
            .reward
            .as_ref()
            .map(RewardToml::to_policy)
            .unwrap_or_default();
        policy.validate()?;
        Ok(policy)
    }

    /// The harness configuration.
    pub fn eval_config(&self) -> EvalConfig {
        self.harness
            .as_ref()
            .map(HarnessToml::to_eval_config)
            .unwrap_or_default()
    }

    /// The configured catalog root, if any.
    pub fn data_sources_root(&self) -> Option<&Path> {
        self.data_sources.as_ref()?.root.as_deref()
    }
}

/// TOML-serializable reward policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct RewardToml {
    /// Similarity below which correctness is zero
    pub similarity_threshold: Option<f64>,

    /// Span from the threshold to full credit; defaults to the rest of the
    /// way to 1 when only the threshold is set
    pub similarity_ramp: Option<f64>,

    /// Extra actions that halve efficiency
    pub half_life_actions: Option<f64>,

    /// Budget for cases without their own
    pub default_optimal_actions: Option<u32>,
}

impl RewardToml {
    /// Merge another config into this one (other takes precedence for Some values).
    pub fn merge(&mut self, other: RewardToml) {
        if other.similarity_threshold.is_some() {
            self.similarity_threshold = other.similarity_threshold;
        }
        if other.similarity_ramp.is_some() {
            self.similarity_ramp = other.similarity_ramp;
        }
        if other.half_life_actions.is_some() {
            self.half_life_actions = other.half_life_actions;
        }
        if other.default_optimal_actions.is_some() {
            self.default_optimal_actions = other.default_optimal_actions;
        }
    }

    /// Convert to a RewardPolicy, applying overrides to defaults.
    pub fn to_policy(&self) -> RewardPolicy {
        let mut policy = RewardPolicy::default();

        if let Some(v) = self.similarity_threshold {
            policy = policy.with_similarity_threshold(v);
        }
        if let Some(v) = self.similarity_ramp {
            policy.similarity_ramp = v;
        }
        if let Some(v) = self.half_life_actions {
            policy.half_life_actions = v;
        }
        if let Some(v) = self.default_optimal_actions {
            policy.default_optimal_actions = v;
        }

        policy
    }
}

/// TOML-serializable harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct HarnessToml {
    /// Maximum concurrent evaluations
    pub concurrency: Option<usize>,

    /// Additional attempts after a failed run
    pub max_retries: Option<usize>,
}

impl HarnessToml {
    pub fn merge(&mut self, other: HarnessToml) {
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.max_retries.is_some() {
            self.max_retries = other.max_retries;
        }
    }

    pub fn to_eval_config(&self) -> EvalConfig {
        let mut config = EvalConfig::default();

        if let Some(v) = self.concurrency {
            config = config.with_concurrency(v);
        }
        if let Some(v) = self.max_retries {
            config = config.with_max_retries(v);
        }

        config
    }
}

/// TOML-serializable data-source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct DataSourcesToml {
    /// Catalog root directory
    pub root: Option<PathBuf>,
}

impl DataSourcesToml {
    pub fn merge(&mut self, other: DataSourcesToml) {
        if other.root.is_some() {
            self.root = other.root;
        }
    }
}

/// Handles config file discovery and loading.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// User-global config (~/.sqlbench/config.toml)
    global_path: PathBuf,

    /// Project-local config (./sqlbench.toml)
    local_path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader for the standard locations.
    pub fn new() -> Self {
        Self::with_paths(Self::global_config_path(), Self::local_config_path())
    }

    /// Create a loader for explicit global and local paths.
    pub fn with_paths(global_path: PathBuf, local_path: PathBuf) -> Self {
        Self {
            global_path,
            local_path,
        }
    }

    /// Get the path to the user-global config file.
    pub fn global_config_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".sqlbench").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".sqlbench/config.toml"))
    }

    /// Get the path to the project-local config file.
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("sqlbench.toml")
    }

    /// Load config from all sources, merging them together.
    ///
    /// Missing files are skipped silently; unreadable or malformed files are
    /// logged and skipped. Returns the merged config and the files that were
    /// loaded.
    pub fn load(&self) -> (SqlbenchConfig, Vec<PathBuf>) {
        let mut config = SqlbenchConfig::default();
        let mut loaded_files = Vec::new();

        // Global first (lower priority), then local
        for (scope, path) in [("global", &self.global_path), ("local", &self.local_path)] {
            if !path.exists() {
                continue;
            }
            match Self::load_file(path) {
                Ok(file_config) => {
                    config.merge(file_config);
                    loaded_files.push(path.clone());
                }
                Err(e) => log::warn!("Failed to load {} config: {}", scope, e),
            }
        }

        (config, loaded_files)
    }

    /// Load a single config file.
    pub fn load_file(path: &Path) -> Result<SqlbenchConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}
