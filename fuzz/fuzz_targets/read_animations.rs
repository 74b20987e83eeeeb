#![no_main]
use libfuzzer_sys::fuzz_target;
use tae_lib::formats::animation::read_animations;
use tae_lib::{FormatProfile, TaeReader};

fuzz_target!(|input: (FormatProfile, u8, &[u8])| {
    // Test that this doesn't panic on errors.
    let (profile, count, data) = input;
    let mut reader = TaeReader::new(data, profile.varint_long);
    let _result = read_animations(&mut reader, count.into(), profile);
});
