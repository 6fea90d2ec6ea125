//! Argon2 cost parameters.
//!
//! Requesters may override any of the three costs per promise. An override
//! that is absent falls back to the component-wide default; an override that is
//! present is always honoured as given, including `0` (which validation then
//! rejects rather than silently replacing with the default).

use serde::{Deserialize, Serialize};

/// Default number of Argon2 passes.
pub const DEFAULT_TIME_COST: u32 = 3;
/// Default Argon2 memory size in KiB (4 MiB).
pub const DEFAULT_MEMORY_COST: u32 = 4096;
/// Default Argon2 lane count.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Caller-supplied cost overrides carried through a promise unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
}

impl CostOverrides {
    /// No overrides: every cost comes from the defaults.
    pub const NONE: Self = Self {
        time_cost: None,
        memory_cost: None,
        parallelism: None,
    };

    pub fn is_empty(&self) -> bool {
        self.time_cost.is_none() && self.memory_cost.is_none() && self.parallelism.is_none()
    }
}

/// Fully-resolved Argon2 cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParams {
    /// Number of passes over memory.
    pub time_cost: u32,
    /// Memory size in KiB.
    pub memory_cost: u32,
    /// Number of lanes.
    pub parallelism: u32,
}

impl CostParams {
    pub fn new(time_cost: u32, memory_cost: u32, parallelism: u32) -> Self {
        Self {
            time_cost,
            memory_cost,
            parallelism,
        }
    }

    /// Apply per-request overrides on top of these parameters.
    pub fn with_overrides(&self, overrides: &CostOverrides) -> Self {
        Self {
            time_cost: overrides.time_cost.unwrap_or(self.time_cost),
            memory_cost: overrides.memory_cost.unwrap_or(self.memory_cost),
            parallelism: overrides.parallelism.unwrap_or(self.parallelism),
        }
    }
}

impl Default for CostParams {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_COST, DEFAULT_MEMORY_COST, DEFAULT_PARALLELISM)
    }
}
