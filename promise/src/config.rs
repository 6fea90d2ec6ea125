//! Promise service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use roundseed_crypto::MIN_KEYSTREAM_LEN;
use roundseed_types::CostParams;

/// Argon2 requires at least this many KiB of memory per lane.
pub const MIN_MEMORY_PER_LANE: u32 = 8;

/// Derivations run on tokio's blocking pool, which defaults to 512 threads.
pub const MAX_CONCURRENT_DERIVATIONS: usize = 512;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Upper bounds on caller-controlled resource usage per request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostLimits {
    /// Largest accepted `time_cost` override.
    pub max_time_cost: u32,
    /// Largest accepted `memory_cost` override, in KiB.
    pub max_memory_cost: u32,
    /// Largest accepted `parallelism` override.
    pub max_parallelism: u32,
    /// Largest seed a promise may carry, in bytes.
    pub max_seed_bytes: usize,
}

impl Default for CostLimits {
    fn default() -> Self {
        Self {
            max_time_cost: 16,
            max_memory_cost: 262_144,
            max_parallelism: 8,
            max_seed_bytes: 1024,
        }
    }
}

/// Configuration for a [`PromiseService`](crate::PromiseService).
///
/// Can be loaded from a TOML file via [`PromiseConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromiseConfig {
    /// Maximum number of keystream derivations running at once.
    #[serde(default = "default_max_concurrent_derivations")]
    pub max_concurrent_derivations: usize,

    /// Abandon a derivation that takes longer than this. No limit when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_timeout_ms: Option<u64>,

    /// Costs used for every parameter the request does not override.
    #[serde(default)]
    pub default_costs: CostParams,

    /// Caps on caller-supplied overrides and seed length.
    #[serde(default)]
    pub limits: CostLimits,
}

fn default_max_concurrent_derivations() -> usize {
    4
}

impl PromiseConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn derivation_timeout(&self) -> Option<Duration> {
        self.derivation_timeout_ms.map(Duration::from_millis)
    }

    /// Check the configuration is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.default_costs;
        let l = &self.limits;

        if d.time_cost == 0 || d.parallelism == 0 {
            return Err(ConfigError::Invalid(
                "default time_cost and parallelism must be positive".into(),
            ));
        }
        if d.memory_cost < MIN_MEMORY_PER_LANE.saturating_mul(d.parallelism) {
            return Err(ConfigError::Invalid(format!(
                "default memory_cost {} KiB is below {} KiB per lane",
                d.memory_cost, MIN_MEMORY_PER_LANE
            )));
        }
        if d.time_cost > l.max_time_cost
            || d.memory_cost > l.max_memory_cost
            || d.parallelism > l.max_parallelism
        {
            return Err(ConfigError::Invalid(
                "default costs exceed the configured limits".into(),
            ));
        }
        if l.max_seed_bytes < MIN_KEYSTREAM_LEN {
            return Err(ConfigError::Invalid(format!(
                "max_seed_bytes must be at least {MIN_KEYSTREAM_LEN}"
            )));
        }
        if self.max_concurrent_derivations == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_derivations must be positive".into(),
            ));
        }
        if self.max_concurrent_derivations > MAX_CONCURRENT_DERIVATIONS {
            return Err(ConfigError::Invalid(format!(
                "max_concurrent_derivations must be at most {MAX_CONCURRENT_DERIVATIONS}"
            )));
        }
        if self.derivation_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "derivation_timeout_ms must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PromiseConfig {
    fn default() -> Self {
        Self {
            max_concurrent_derivations: default_max_concurrent_derivations(),
            derivation_timeout_ms: None,
            default_costs: CostParams::default(),
            limits: CostLimits::default(),
        }
    }
}
