//! Typed create/resolve requests.

use serde::{Deserialize, Serialize};

use roundseed_types::{serde_b64, CostOverrides, RoundTimestamp, ServerId};

use crate::config::PromiseConfig;
use crate::error::PromiseError;
use crate::validator::{self, Violation};

/// Request to issue a fresh seed bound to a server round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePromiseRequest {
    pub server_id: ServerId,
    pub trustkey_ts: RoundTimestamp,
    /// Requested seed length in bytes.
    pub n_bytes: usize,
    #[serde(flatten)]
    pub costs: CostOverrides,
}

impl CreatePromiseRequest {
    pub fn new(server_id: impl Into<ServerId>, trustkey_ts: u64, n_bytes: usize) -> Self {
        Self {
            server_id: server_id.into(),
            trustkey_ts: RoundTimestamp::new(trustkey_ts),
            n_bytes,
            costs: CostOverrides::NONE,
        }
    }

    pub fn with_costs(mut self, costs: CostOverrides) -> Self {
        self.costs = costs;
        self
    }

    /// Range checks for a request built directly rather than parsed from JSON.
    pub fn check(&self, config: &PromiseConfig) -> Vec<Violation> {
        let mut violations = Vec::new();
        validator::check_server_id(&self.server_id, &mut violations);
        validator::check_seed_length("n_bytes", self.n_bytes, &config.limits, &mut violations);
        validator::check_costs(&self.costs, config, &mut violations);
        violations
    }
}

/// The seed as carried by a resolve request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedInput {
    /// Raw bytes.
    Raw(Vec<u8>),
    /// Standard, padded base64.
    Base64(String),
    /// A value of a type that cannot carry bytes; names the offending type.
    Unsupported(String),
}

impl SeedInput {
    /// Decode to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, PromiseError> {
        match self {
            SeedInput::Raw(bytes) => Ok(bytes.clone()),
            SeedInput::Base64(encoded) => serde_b64::decode(encoded)
                .map_err(|e| PromiseError::UndecodableSeed(format!("invalid base64: {e}"))),
            SeedInput::Unsupported(kind) => Err(PromiseError::UndecodableSeed(format!(
                "seed must be bytes or a base64 string, got {kind}"
            ))),
        }
    }
}

/// Request to resolve a previously created promise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvePromiseRequest {
    pub server_id: ServerId,
    pub trustkey_ts: RoundTimestamp,
    /// `None` when the request carried no seed at all.
    pub seed: Option<SeedInput>,
    pub costs: CostOverrides,
}

impl ResolvePromiseRequest {
    pub fn new(server_id: impl Into<ServerId>, trustkey_ts: u64, seed: SeedInput) -> Self {
        Self {
            server_id: server_id.into(),
            trustkey_ts: RoundTimestamp::new(trustkey_ts),
            seed: Some(seed),
            costs: CostOverrides::NONE,
        }
    }

    pub fn with_costs(mut self, costs: CostOverrides) -> Self {
        self.costs = costs;
        self
    }

    /// Range checks for a request built directly rather than parsed from JSON.
    ///
    /// The seed is checked separately, after decoding.
    pub fn check(&self, config: &PromiseConfig) -> Vec<Violation> {
        let mut violations = Vec::new();
        validator::check_server_id(&self.server_id, &mut violations);
        validator::check_costs(&self.costs, config, &mut violations);
        violations
    }
}
