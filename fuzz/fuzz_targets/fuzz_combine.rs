#![no_main]

use libfuzzer_sys::fuzz_target;

use roundseed_crypto::{combine, combine_in_place};

// Split the input into a seed and a keystream of equal length and check the
// combiner is an involution.
fuzz_target!(|data: &[u8]| {
    let (seed, keystream) = data.split_at(data.len() / 2);
    let keystream = &keystream[..seed.len()];

    let blinded = combine(seed, keystream).expect("equal lengths");
    let mut unblinded = blinded.clone();
    combine_in_place(&mut unblinded, keystream).expect("equal lengths");
    assert_eq!(unblinded, seed);

    if !data.is_empty() {
        assert!(combine(data, &data[1..]).is_err());
    }
});
