#![no_main]

use libfuzzer_sys::fuzz_target;

use roundseed_promise::SeedInput;
use roundseed_types::serde_b64;

// Base64 seed decoding never panics, and whatever decodes re-encodes to the
// same canonical string.
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data).into_owned();
    if let Ok(bytes) = SeedInput::Base64(text.clone()).decode() {
        assert_eq!(serde_b64::encode(&bytes), text);
    }

    let raw = SeedInput::Raw(data.to_vec());
    assert_eq!(raw.decode().ok().as_deref(), Some(data));
});
