//! Promise orchestration.
//!
//! [`PromiseService`] sequences the gates of both operations. Each gate either
//! passes or rejects the request with one error; nothing after a failed gate
//! runs. In particular a seed is only drawn once every create gate has passed,
//! and the keystream is only derived once the trust verdict is confirmed.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;
use zeroize::Zeroizing;

use roundseed_crypto::{combine_in_place, decode_committed_secret, SeedSource};
use roundseed_store::{ServerRegistry, TrustLookup};

use crate::config::{ConfigError, PromiseConfig};
use crate::derivation::{DerivationPool, KeystreamJob};
use crate::error::PromiseError;
use crate::request::{CreatePromiseRequest, ResolvePromiseRequest};
use crate::response::{CreatePromiseResult, PromiseResponse};
use crate::round::{check_alignment, RoundAlignment};
use crate::seed::generate_seed;
use crate::spans::{promise_create_span, promise_resolve_span};
use crate::validator::{self, validate_create, validate_resolve};

/// Entry point for the create and resolve operations.
///
/// Cheap to clone; clones share the registry, seed source and derivation pool.
#[derive(Clone)]
pub struct PromiseService {
    registry: Arc<dyn ServerRegistry>,
    seeds: Arc<dyn SeedSource>,
    pool: DerivationPool,
    config: PromiseConfig,
}

impl PromiseService {
    pub fn new(
        config: PromiseConfig,
        registry: Arc<dyn ServerRegistry>,
        seeds: Arc<dyn SeedSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = DerivationPool::new(config.max_concurrent_derivations, config.derivation_timeout());
        Ok(Self {
            registry,
            seeds,
            pool,
            config,
        })
    }

    pub fn config(&self) -> &PromiseConfig {
        &self.config
    }

    pub fn pool(&self) -> &DerivationPool {
        &self.pool
    }

    /// Issue a fresh seed bound to a connected server's round.
    pub fn create(&self, request: CreatePromiseRequest) -> Result<CreatePromiseResult, PromiseError> {
        let _span = promise_create_span(&request.server_id, request.trustkey_ts).entered();

        let violations = request.check(&self.config);
        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "create rejected by validation");
            return Err(PromiseError::Validation(violations));
        }

        let descriptor = match self.registry.lookup(&request.server_id) {
            Some(descriptor) if descriptor.connected => descriptor,
            Some(_) => {
                tracing::debug!("server is not connected");
                return Err(PromiseError::ServerUnavailable(request.server_id));
            }
            None => {
                tracing::debug!("server is unknown");
                return Err(PromiseError::ServerUnavailable(request.server_id));
            }
        };

        if check_alignment(request.trustkey_ts, descriptor.round_duration) == RoundAlignment::Misaligned {
            tracing::debug!(
                round_duration = descriptor.round_duration,
                "round is not aligned"
            );
            return Err(PromiseError::MisalignedRound {
                round: request.trustkey_ts,
                round_duration: descriptor.round_duration,
            });
        }

        let seed = generate_seed(self.seeds.as_ref(), request.n_bytes).inspect_err(|e| {
            tracing::warn!(error = %e, "seed generation failed");
        })?;

        tracing::info!(n_bytes = seed.len(), "promise created");
        Ok(CreatePromiseResult {
            server_id: request.server_id,
            trustkey_ts: request.trustkey_ts,
            seed,
            costs: request.costs,
        })
    }

    /// Blind a previously issued seed with the keystream of its round's
    /// trusted trust key.
    pub async fn resolve(&self, request: ResolvePromiseRequest) -> Result<Vec<u8>, PromiseError> {
        let span = promise_resolve_span(&request.server_id, request.trustkey_ts);
        self.resolve_inner(request).instrument(span).await
    }

    async fn resolve_inner(&self, request: ResolvePromiseRequest) -> Result<Vec<u8>, PromiseError> {
        let violations = request.check(&self.config);
        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "resolve rejected by validation");
            return Err(PromiseError::Validation(violations));
        }

        let mut seed = match &request.seed {
            Some(input) => input.decode()?,
            None => return Err(PromiseError::UndecodableSeed("seed is missing".into())),
        };

        let mut violations = Vec::new();
        validator::check_seed_length("seed", seed.len(), &self.config.limits, &mut violations);
        if !violations.is_empty() {
            tracing::debug!(len = seed.len(), "seed length out of range");
            return Err(PromiseError::Validation(violations));
        }

        let descriptor = self.registry.lookup(&request.server_id).ok_or_else(|| {
            tracing::debug!("server is unknown");
            PromiseError::ServerUnavailable(request.server_id.clone())
        })?;

        let found = descriptor
            .trust_keys
            .find(request.trustkey_ts)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "trust key lookup failed"))?;

        let record = match TrustLookup::classify(found) {
            TrustLookup::Trusted(record) => record,
            TrustLookup::Untrusted(record) => {
                tracing::debug!("trust key is not trusted yet");
                return Err(PromiseError::Untrusted(Box::new(record)));
            }
            TrustLookup::NotFound => {
                tracing::debug!("no trust key for round");
                return Err(PromiseError::TrustKeyNotFound(request.trustkey_ts));
            }
        };

        let salt = decode_committed_secret(&record.trustkey)
            .map(Zeroizing::new)
            .map_err(|e| {
                tracing::warn!(error = %e, "committed secret is malformed");
                PromiseError::Derivation(e.to_string())
            })?;

        let costs = self.config.default_costs.with_overrides(&request.costs);
        let keystream = self
            .pool
            .derive(KeystreamJob {
                inputs: record.inputs,
                salt,
                output_len: seed.len(),
                costs,
            })
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "keystream derivation failed"))?;

        combine_in_place(&mut seed, &keystream).map_err(|e| PromiseError::Derivation(e.to_string()))?;

        tracing::info!(n_bytes = seed.len(), "promise resolved");
        Ok(seed)
    }

    /// Validate an untyped create request and shape the outcome as a response.
    pub fn handle_create(&self, raw: &Value) -> PromiseResponse {
        let outcome = validate_create(raw, &self.config)
            .map_err(PromiseError::Validation)
            .and_then(|request| self.create(request));
        match outcome {
            Ok(result) => PromiseResponse::created(result),
            Err(e) => PromiseResponse::from_error(&e),
        }
    }

    /// Validate an untyped resolve request and shape the outcome as a response.
    pub async fn handle_resolve(&self, raw: &Value) -> PromiseResponse {
        let request = match validate_resolve(raw, &self.config) {
            Ok(request) => request,
            Err(violations) => {
                tracing::debug!(count = violations.len(), "resolve rejected by validation");
                return PromiseResponse::from_error(&PromiseError::Validation(violations));
            }
        };
        match self.resolve(request).await {
            Ok(output) => PromiseResponse::resolved(output),
            Err(e) => PromiseResponse::from_error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundseed_crypto::{CryptoError, OsSeedSource};
    use roundseed_store::{ServerDescriptor, StoreError, TrustKeyStore};
    use roundseed_types::{RoundTimestamp, ServerId, TrustKeyRecord};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapStore(HashMap<RoundTimestamp, TrustKeyRecord>);

    #[async_trait::async_trait]
    impl TrustKeyStore for MapStore {
        async fn find(&self, round: RoundTimestamp) -> Result<Option<TrustKeyRecord>, StoreError> {
            Ok(self.0.get(&round).cloned())
        }
    }

    struct OneServer(Mutex<ServerDescriptor>);

    impl ServerRegistry for OneServer {
        fn lookup(&self, server_id: &ServerId) -> Option<ServerDescriptor> {
            (server_id.as_str() == "srv1").then(|| self.0.lock().unwrap().clone())
        }
    }

    struct ZeroSource;

    impl SeedSource for ZeroSource {
        fn generate(&self, len: usize) -> Result<Vec<u8>, CryptoError> {
            Ok(vec![0u8; len])
        }

        fn name(&self) -> &str {
            "zero"
        }
    }

    fn cheap_config() -> PromiseConfig {
        let mut config = PromiseConfig::default();
        config.default_costs = roundseed_types::CostParams::new(1, 8, 1);
        config
    }

    fn service(records: Vec<TrustKeyRecord>, seeds: Arc<dyn SeedSource>) -> PromiseService {
        let store = MapStore(records.into_iter().map(|r| (r.round, r)).collect());
        let registry = OneServer(Mutex::new(ServerDescriptor {
            connected: true,
            round_duration: 60,
            trust_keys: Arc::new(store),
        }));
        PromiseService::new(cheap_config(), Arc::new(registry), seeds).unwrap()
    }

    fn trusted(ts: u64) -> TrustKeyRecord {
        TrustKeyRecord::new(RoundTimestamp::new(ts), "00112233445566778899", b"inputs".to_vec(), true)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PromiseConfig {
            max_concurrent_derivations: 0,
            ..PromiseConfig::default()
        };
        let registry = OneServer(Mutex::new(ServerDescriptor {
            connected: true,
            round_duration: 60,
            trust_keys: Arc::new(MapStore(HashMap::new())),
        }));
        assert!(PromiseService::new(config, Arc::new(registry), Arc::new(OsSeedSource)).is_err());
    }

    #[test]
    fn create_issues_seed_of_requested_length() {
        let svc = service(vec![], Arc::new(OsSeedSource));
        let result = svc.create(CreatePromiseRequest::new("srv1", 120, 32)).unwrap();
        assert_eq!(result.seed.len(), 32);
        assert_eq!(result.trustkey_ts.as_secs(), 120);
    }

    #[test]
    fn create_rejects_misaligned_round() {
        let svc = service(vec![], Arc::new(OsSeedSource));
        let err = svc.create(CreatePromiseRequest::new("srv1", 125, 32)).unwrap_err();
        assert!(matches!(err, PromiseError::MisalignedRound { round_duration: 60, .. }));
    }

    #[test]
    fn create_rejects_unknown_server() {
        let svc = service(vec![], Arc::new(OsSeedSource));
        let err = svc.create(CreatePromiseRequest::new("srv2", 120, 32)).unwrap_err();
        assert!(matches!(err, PromiseError::ServerUnavailable(_)));
    }

    #[tokio::test]
    async fn zero_seed_resolves_to_keystream() {
        let svc = service(vec![trusted(120)], Arc::new(ZeroSource));
        let promise = svc.create(CreatePromiseRequest::new("srv1", 120, 16)).unwrap();
        let output = svc.resolve(promise.into_resolve_request()).await.unwrap();

        let salt = decode_committed_secret("00112233445566778899").unwrap();
        let keystream = roundseed_crypto::derive_keystream(
            b"inputs",
            &salt,
            16,
            &roundseed_types::CostParams::new(1, 8, 1),
        )
        .unwrap();
        assert_eq!(output, *keystream);
    }

    #[tokio::test]
    async fn missing_seed_is_undecodable() {
        let svc = service(vec![trusted(120)], Arc::new(OsSeedSource));
        let request = ResolvePromiseRequest {
            seed: None,
            ..CreatePromiseResult {
                server_id: ServerId::new("srv1"),
                trustkey_ts: RoundTimestamp::new(120),
                seed: vec![0; 8],
                costs: Default::default(),
            }
            .into_resolve_request()
        };
        let err = svc.resolve(request).await.unwrap_err();
        assert!(matches!(err, PromiseError::UndecodableSeed(_)));
    }

    #[tokio::test]
    async fn malformed_secret_fails_derivation() {
        let mut record = trusted(120);
        record.trustkey = "not-hex".into();
        let svc = service(vec![record], Arc::new(OsSeedSource));
        let promise = svc.create(CreatePromiseRequest::new("srv1", 120, 16)).unwrap();
        let err = svc.resolve(promise.into_resolve_request()).await.unwrap_err();
        assert!(matches!(err, PromiseError::Derivation(_)));
    }

    #[tokio::test]
    async fn short_resolve_seed_is_a_violation() {
        let svc = service(vec![trusted(120)], Arc::new(OsSeedSource));
        let request = ResolvePromiseRequest::new(
            "srv1",
            120,
            crate::request::SeedInput::Raw(vec![1, 2, 3]),
        );
        match svc.resolve(request).await.unwrap_err() {
            PromiseError::Validation(violations) => assert_eq!(violations[0].field, "seed"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
