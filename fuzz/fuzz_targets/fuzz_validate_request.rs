#![no_main]

use libfuzzer_sys::fuzz_target;

use roundseed_promise::{validate_create, validate_resolve, PromiseConfig};

// Request validation must never panic on arbitrary JSON, and a rejection
// always names at least one field.
fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let config = PromiseConfig::default();

    match validate_create(&raw, &config) {
        Ok(request) => assert!(request.check(&config).is_empty()),
        Err(violations) => assert!(!violations.is_empty()),
    }
    match validate_resolve(&raw, &config) {
        Ok(request) => {
            assert!(request.check(&config).is_empty());
            if let Some(seed) = request.seed {
                let _ = seed.decode();
            }
        }
        Err(violations) => assert!(!violations.is_empty()),
    }
});
