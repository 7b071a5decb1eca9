//! Agent configuration.
//!
//! All tunable knobs for the reasoning engine live here: embedding
//! dimensionality, gate threshold, step bounds, completion marker, the
//! database location and the seeds for the deterministic random sources.
//! Validation happens at construction time so a misconfigured deployment is
//! rejected before it serves a single query.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "COTOOLS_";

/// Configuration for the reasoning engine and its components
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Embedding dimensionality shared by both encoders and the catalogue
    pub embedding_dim: usize,
    /// Tool-need gate threshold in [0, 1]
    pub gate_threshold: f32,
    /// Bound on the gate's score perturbation; 0 disables it (negative values
    /// are treated as 0)
    pub gate_perturbation: f32,
    /// Hard upper bound on reasoning steps per query
    pub max_steps: u32,
    /// Minimum steps before the completion marker may terminate the loop
    pub min_steps: u32,
    /// Marker whose appearance in the transcript allows termination
    pub completion_marker: String,
    /// Path to the SQLite database backing the catalogue and interaction log
    pub database_path: String,
    /// Per-call timeout for tool invocations, in seconds
    pub tool_timeout_secs: u64,
    /// Base seed for the query encoder
    pub query_encoder_seed: u64,
    /// Base seed for the tool description encoder
    pub description_encoder_seed: u64,
    /// Seed for the gate's perturbation source
    pub gate_seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 768,
            gate_threshold: 0.5,
            gate_perturbation: 0.1,
            max_steps: 10,
            min_steps: 8,
            completion_marker: "Therefore, the answer is:".to_string(),
            database_path: "database/agent_data.db".to_string(),
            tool_timeout_secs: 30,
            query_encoder_seed: 0x5eed_0001,
            description_encoder_seed: 0x5eed_0002,
            gate_seed: 0x5eed_0003,
        }
    }
}

impl AgentConfig {
    /// Validate the configuration.
    ///
    /// Returns the first configuration-fatal error found. Called by every
    /// component constructor that consumes this config, so invalid values are
    /// caught before query processing starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidDimension(self.embedding_dim));
        }
        if !(0.0..=1.0).contains(&self.gate_threshold) || !self.gate_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.gate_threshold));
        }
        if self.max_steps == 0 || self.min_steps > self.max_steps {
            return Err(ConfigError::InvalidStepBounds {
                min: self.min_steps,
                max: self.max_steps,
            });
        }
        if self.completion_marker.trim().is_empty() {
            return Err(ConfigError::EmptyCompletionMarker);
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `COTOOLS_*` environment variable overrides on top of `self`.
    ///
    /// Recognized variables: `COTOOLS_EMBEDDING_DIM`, `COTOOLS_GATE_THRESHOLD`,
    /// `COTOOLS_MAX_STEPS`, `COTOOLS_MIN_STEPS`, `COTOOLS_DATABASE_PATH`,
    /// `COTOOLS_TOOL_TIMEOUT_SECS`.
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(dim) = env_parse::<usize>("EMBEDDING_DIM")? {
            self.embedding_dim = dim;
        }
        if let Some(threshold) = env_parse::<f32>("GATE_THRESHOLD")? {
            self.gate_threshold = threshold;
        }
        if let Some(max_steps) = env_parse::<u32>("MAX_STEPS")? {
            self.max_steps = max_steps;
        }
        if let Some(min_steps) = env_parse::<u32>("MIN_STEPS")? {
            self.min_steps = min_steps;
        }
        if let Ok(path) = std::env::var(format!("{ENV_PREFIX}DATABASE_PATH")) {
            self.database_path = path;
        }
        if let Some(timeout) = env_parse::<u64>("TOOL_TIMEOUT_SECS")? {
            self.tool_timeout_secs = timeout;
        }
        Ok(self)
    }

    /// Build a configuration from defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env_overrides()
    }
}

/// Read and parse an optional `COTOOLS_`-prefixed environment variable
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let key = format!("{ENV_PREFIX}{name}");
    match std::env::var(&key) {
        Ok(raw) => {
            let value = raw
                .parse::<T>()
                .with_context(|| format!("Invalid value for {key}: '{raw}'"))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
