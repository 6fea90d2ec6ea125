//! Offline recomputation of resolved promises.
//!
//! Anyone holding the committed secret and the trust key's inputs can derive
//! the keystream and check a published result. These helpers go through the
//! same validation, derivation pool and combiner as the promise service.

use zeroize::Zeroizing;

use roundseed_crypto::{combine_in_place, decode_committed_secret};
use roundseed_promise::validator::{check_costs, check_seed_length};
use roundseed_promise::{DerivationPool, KeystreamJob, PromiseConfig, PromiseError, SeedInput};
use roundseed_types::CostOverrides;

/// Public material of one committed trust key.
pub struct TrustKeyMaterial {
    /// Hex-encoded committed secret.
    pub trustkey: String,
    pub inputs: Vec<u8>,
}

/// Result of checking a claimed output against the recomputed one.
#[derive(Debug, PartialEq, Eq)]
pub enum AuditVerdict {
    /// No claimed output was given; carries the recomputed output.
    Computed(Vec<u8>),
    Match(Vec<u8>),
    Mismatch { expected: Vec<u8>, claimed: Vec<u8> },
}

impl AuditVerdict {
    pub fn judge(expected: Vec<u8>, claimed: Option<Vec<u8>>) -> Self {
        match claimed {
            None => AuditVerdict::Computed(expected),
            Some(claimed) if claimed == expected => AuditVerdict::Match(expected),
            Some(claimed) => AuditVerdict::Mismatch { expected, claimed },
        }
    }
}

/// Derive the keystream a trust key yields for `length` bytes.
pub async fn derive(
    config: &PromiseConfig,
    material: &TrustKeyMaterial,
    length: usize,
    costs: &CostOverrides,
) -> Result<Zeroizing<Vec<u8>>, PromiseError> {
    let mut violations = Vec::new();
    check_seed_length("length", length, &config.limits, &mut violations);
    check_costs(costs, config, &mut violations);
    if !violations.is_empty() {
        return Err(PromiseError::Validation(violations));
    }

    let salt = decode_committed_secret(&material.trustkey)
        .map(Zeroizing::new)
        .map_err(|e| PromiseError::Derivation(e.to_string()))?;

    let pool = DerivationPool::new(1, config.derivation_timeout());
    pool.derive(KeystreamJob {
        inputs: material.inputs.clone(),
        salt,
        output_len: length,
        costs: config.default_costs.with_overrides(costs),
    })
    .await
}

/// Recompute the output a resolve of `seed` against `material` produces.
pub async fn recompute(
    config: &PromiseConfig,
    material: &TrustKeyMaterial,
    seed: &SeedInput,
    costs: &CostOverrides,
) -> Result<Vec<u8>, PromiseError> {
    let mut output = seed.decode()?;
    let keystream = derive(config, material, output.len(), costs).await?;
    combine_in_place(&mut output, &keystream).map_err(|e| PromiseError::Derivation(e.to_string()))?;
    Ok(output)
}
