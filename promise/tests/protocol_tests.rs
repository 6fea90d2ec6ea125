//! End-to-end create/resolve scenarios against nullable collaborators.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use roundseed_crypto::{combine, decode_committed_secret, derive_keystream, OsSeedSource};
use roundseed_nullables::{NullRegistry, NullSeedSource, NullTrustKeyStore};
use roundseed_promise::{
    CreatePromiseRequest, ErrorCode, PromiseConfig, PromiseError, PromiseService,
    ResolvePromiseRequest, SeedInput,
};
use roundseed_types::{serde_b64, CostOverrides, CostParams, RoundTimestamp, TrustKeyRecord};

const SECRET: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90";

fn cheap_config() -> PromiseConfig {
    PromiseConfig {
        default_costs: CostParams::new(1, 8, 1),
        ..PromiseConfig::default()
    }
}

fn record(ts: u64, trusted: bool) -> TrustKeyRecord {
    TrustKeyRecord::new(RoundTimestamp::new(ts), SECRET, b"round inputs".to_vec(), trusted)
}

struct Harness {
    registry: Arc<NullRegistry>,
    store: Arc<NullTrustKeyStore>,
    seeds: Arc<NullSeedSource>,
    service: PromiseService,
}

fn harness_with(config: PromiseConfig) -> Harness {
    let registry = Arc::new(NullRegistry::new());
    let store = registry.add_server("srv1", 60);
    let seeds = Arc::new(NullSeedSource::new());
    let service = PromiseService::new(config, registry.clone(), seeds.clone()).unwrap();
    Harness {
        registry,
        store,
        seeds,
        service,
    }
}

fn harness() -> Harness {
    harness_with(cheap_config())
}

fn expected_output(seed: &[u8], costs: &CostParams) -> Vec<u8> {
    let salt = decode_committed_secret(SECRET).unwrap();
    let keystream = derive_keystream(b"round inputs", &salt, seed.len(), costs).unwrap();
    combine(seed, &keystream).unwrap()
}

#[tokio::test]
async fn aligned_round_creates_promise() {
    let h = harness();
    let response = h
        .service
        .handle_create(&json!({"server_id": "srv1", "trustkey_ts": 120, "n_bytes": 32}));
    assert!(response.success);

    let created = response.created_result().unwrap();
    assert_eq!(created.server_id.as_str(), "srv1");
    assert_eq!(created.trustkey_ts.as_secs(), 120);
    assert_eq!(created.seed, NullSeedSource::expected_bytes(0, 32));
    assert!(created.costs.is_empty());
}

#[tokio::test]
async fn create_payload_drops_requested_length() {
    let h = harness();
    let response = h.service.handle_create(
        &json!({"server_id": "srv1", "trustkey_ts": 120, "n_bytes": 8, "time_cost": 2}),
    );
    let value = serde_json::to_value(&response).unwrap();
    let result = value["result"].as_object().unwrap();
    assert!(!result.contains_key("n_bytes"));
    assert_eq!(result["time_cost"], 2);
    assert!(!result.contains_key("memory_cost"));
    assert!(!result.contains_key("parallelism"));
}

#[tokio::test]
async fn misaligned_round_rejected_without_seed() {
    let h = harness();
    let response = h
        .service
        .handle_create(&json!({"server_id": "srv1", "trustkey_ts": 125, "n_bytes": 32}));
    assert!(!response.success);
    assert_eq!(response.error_code, Some(3));
    assert_eq!(h.seeds.calls(), 0);
}

#[tokio::test]
async fn unknown_or_disconnected_server_rejected() {
    let h = harness();
    let response = h
        .service
        .handle_create(&json!({"server_id": "srv9", "trustkey_ts": 120, "n_bytes": 32}));
    assert_eq!(response.error_code, Some(2));

    h.registry.set_connected("srv1", false);
    let response = h
        .service
        .handle_create(&json!({"server_id": "srv1", "trustkey_ts": 120, "n_bytes": 32}));
    assert_eq!(response.error_code, Some(2));
    assert_eq!(h.seeds.calls(), 0);
}

#[tokio::test]
async fn validation_failure_reports_every_field() {
    let h = harness();
    let response = h
        .service
        .handle_create(&json!({"trustkey_ts": "soon", "n_bytes": 2}));
    assert_eq!(response.error_code, Some(1));
    let fields: Vec<_> = response
        .validation_errors
        .unwrap()
        .into_iter()
        .map(|v| v.field)
        .collect();
    assert_eq!(fields, vec!["server_id", "trustkey_ts", "n_bytes"]);
    assert_eq!(h.seeds.calls(), 0);
}

#[tokio::test]
async fn seed_source_failure_is_code_10() {
    let h = harness();
    h.seeds.fail_with("entropy pool drained");
    let response = h
        .service
        .handle_create(&json!({"server_id": "srv1", "trustkey_ts": 120, "n_bytes": 32}));
    assert_eq!(response.error_code, Some(10));
    assert!(response.result.is_none());
}

#[tokio::test]
async fn short_seed_from_source_is_code_10() {
    let h = harness();
    h.seeds.return_short_by(1);
    let err = h
        .service
        .create(CreatePromiseRequest::new("srv1", 120, 32))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SeedGenerationFailed);
}

#[tokio::test]
async fn untrusted_record_rejected_with_record() {
    let h = harness();
    h.store.insert(record(120, false));
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": vec![7u8; 32]}))
        .await;
    assert_eq!(response.error_code, Some(5));
    assert_eq!(response.trustkey, Some(record(120, false)));
    assert!(response.result.is_none());
    assert_eq!(h.service.pool().started(), 0);
}

#[tokio::test]
async fn trusted_resolve_blinds_seed_with_keystream() {
    let h = harness();
    h.store.insert(record(120, true));

    let promise = h
        .service
        .create(CreatePromiseRequest::new("srv1", 120, 32))
        .unwrap();
    let seed = promise.seed.clone();
    let output = h
        .service
        .resolve(promise.into_resolve_request())
        .await
        .unwrap();

    assert_eq!(output.len(), 32);
    assert_ne!(output, seed);
    assert_eq!(h.service.pool().started(), 1);
    assert_eq!(output, expected_output(&seed, &CostParams::new(1, 8, 1)));
}

#[tokio::test]
async fn resolve_is_deterministic() {
    let h = harness();
    h.store.insert(record(120, true));
    let promise = h
        .service
        .create(CreatePromiseRequest::new("srv1", 120, 24))
        .unwrap();

    let first = h
        .service
        .resolve(promise.clone().into_resolve_request())
        .await
        .unwrap();
    let second = h
        .service
        .resolve(promise.into_resolve_request())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn verdict_flip_unblocks_resolution() {
    let h = harness();
    h.store.insert(record(120, false));
    let promise = h
        .service
        .create(CreatePromiseRequest::new("srv1", 120, 16))
        .unwrap();

    let err = h
        .service
        .resolve(promise.clone().into_resolve_request())
        .await
        .unwrap_err();
    assert!(matches!(err, PromiseError::Untrusted(_)));
    assert_eq!(h.service.pool().started(), 0);

    h.store.set_trusted(RoundTimestamp::new(120), true);
    assert!(h.service.resolve(promise.into_resolve_request()).await.is_ok());
    assert_eq!(h.service.pool().started(), 1);
}

#[tokio::test]
async fn base64_and_raw_seeds_agree() {
    let h = harness();
    h.store.insert(record(120, true));
    let seed = vec![0x5au8; 32];

    let raw = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": seed}))
        .await;
    let encoded = h
        .service
        .handle_resolve(&json!({
            "server_id": "srv1", "trustkey_ts": 120, "seed": serde_b64::encode(&seed)
        }))
        .await;

    assert!(raw.success);
    assert_eq!(raw.resolved_output(), encoded.resolved_output());
}

#[tokio::test]
async fn create_response_round_trips_into_resolve() {
    let h = harness();
    h.store.insert(record(120, true));

    let created = h
        .service
        .handle_create(&json!({"server_id": "srv1", "trustkey_ts": 120, "n_bytes": 16, "memory_cost": 16}));
    let payload = serde_json::to_value(&created).unwrap()["result"].clone();
    let resolved = h.service.handle_resolve(&payload).await;
    assert!(resolved.success);

    let seed = &created.created_result().unwrap().seed;
    assert_eq!(
        resolved.resolved_output().unwrap(),
        expected_output(seed, &CostParams::new(1, 16, 1)).as_slice()
    );
}

#[tokio::test]
async fn os_seeds_differ_between_creates() {
    let registry = Arc::new(NullRegistry::new());
    registry.add_server("srv1", 60);
    let service = PromiseService::new(cheap_config(), registry, Arc::new(OsSeedSource)).unwrap();

    let a = service.create(CreatePromiseRequest::new("srv1", 120, 32)).unwrap();
    let b = service.create(CreatePromiseRequest::new("srv1", 120, 32)).unwrap();
    assert_ne!(a.seed, b.seed);
}

#[tokio::test]
async fn store_failure_is_code_4_with_db_error() {
    let h = harness();
    h.store.insert(record(120, true));
    h.store.fail_with("connection reset by peer");
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": vec![1u8; 16]}))
        .await;
    assert_eq!(response.error_code, Some(4));
    assert!(response.db_error.unwrap().contains("connection reset by peer"));
    assert_eq!(h.service.pool().started(), 0);
}

#[tokio::test]
async fn offline_store_is_code_4() {
    let h = harness();
    h.store.insert(record(120, true));
    h.store.go_offline("no route to host");
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": vec![1u8; 16]}))
        .await;
    assert_eq!(response.error_code, Some(4));
    assert!(response.db_error.unwrap().contains("unavailable"));
    assert_eq!(h.service.pool().started(), 0);
}

#[tokio::test]
async fn missing_record_is_code_6() {
    let h = harness();
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 180, "seed": vec![1u8; 16]}))
        .await;
    assert_eq!(response.error_code, Some(6));
    assert_eq!(response.trustkey, None);
    assert_eq!(h.service.pool().started(), 0);
}

#[tokio::test]
async fn missing_or_malformed_seed_is_code_7() {
    let h = harness();
    h.store.insert(record(120, true));
    for request in [
        json!({"server_id": "srv1", "trustkey_ts": 120}),
        json!({"server_id": "srv1", "trustkey_ts": 120, "seed": 12345}),
        json!({"server_id": "srv1", "trustkey_ts": 120, "seed": "not base64!"}),
        // Padding is required: "AQIDBA==" without it.
        json!({"server_id": "srv1", "trustkey_ts": 120, "seed": "AQIDBA"}),
    ] {
        let response = h.service.handle_resolve(&request).await;
        assert_eq!(response.error_code, Some(7), "request: {request}");
    }
    assert_eq!(h.store.lookups(), 0);
}

#[tokio::test]
async fn resolve_checks_known_server_only() {
    let h = harness();
    h.store.insert(record(120, true));
    h.registry.set_connected("srv1", false);
    let output = h
        .service
        .resolve(ResolvePromiseRequest::new("srv1", 120, SeedInput::Raw(vec![9; 16])))
        .await;
    assert!(output.is_ok());

    h.registry.remove("srv1");
    let err = h
        .service
        .resolve(ResolvePromiseRequest::new("srv1", 120, SeedInput::Raw(vec![9; 16])))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ServerUnavailable);
}

#[tokio::test]
async fn validation_failure_never_reaches_store() {
    let h = harness();
    h.store.insert(record(120, true));
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": vec![1u8; 16], "time_cost": 0}))
        .await;
    assert_eq!(response.error_code, Some(1));
    assert_eq!(h.store.lookups(), 0);
}

#[tokio::test]
async fn cost_overrides_change_output() {
    let h = harness();
    h.store.insert(record(120, true));
    let seed = vec![3u8; 16];

    let default = h
        .service
        .resolve(ResolvePromiseRequest::new("srv1", 120, SeedInput::Raw(seed.clone())))
        .await
        .unwrap();
    let overridden = h
        .service
        .resolve(
            ResolvePromiseRequest::new("srv1", 120, SeedInput::Raw(seed.clone())).with_costs(
                CostOverrides {
                    time_cost: Some(2),
                    ..CostOverrides::NONE
                },
            ),
        )
        .await
        .unwrap();

    assert_ne!(default, overridden);
    assert_eq!(overridden, expected_output(&seed, &CostParams::new(2, 8, 1)));
}

#[tokio::test]
async fn slow_derivation_is_code_9() {
    let h = harness_with(PromiseConfig {
        derivation_timeout_ms: Some(1),
        default_costs: CostParams::new(4, 16_384, 1),
        ..PromiseConfig::default()
    });
    h.store.insert(record(120, true));
    let response = h
        .service
        .handle_resolve(&json!({"server_id": "srv1", "trustkey_ts": 120, "seed": vec![1u8; 16]}))
        .await;
    assert_eq!(response.error_code, Some(9));
    assert!(response.result.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_are_independent() {
    let h = harness();
    for round in [60u64, 120, 180, 240] {
        h.store.insert(record(round, true));
    }
    h.store.set_delay(Duration::from_millis(20));

    let mut handles = Vec::new();
    for (i, round) in [60u64, 120, 180, 240].into_iter().enumerate() {
        let service = h.service.clone();
        let seed = vec![i as u8 + 1; 16];
        handles.push(tokio::spawn(async move {
            let output = service
                .resolve(ResolvePromiseRequest::new("srv1", round, SeedInput::Raw(seed.clone())))
                .await
                .unwrap();
            (seed, output)
        }));
    }

    for handle in handles {
        let (seed, output) = handle.await.unwrap();
        assert_eq!(output, expected_output(&seed, &CostParams::new(1, 8, 1)));
    }
    assert_eq!(h.store.lookups(), 4);
    assert_eq!(h.service.pool().available_permits(), 4);
}
