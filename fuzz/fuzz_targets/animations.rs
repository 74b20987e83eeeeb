#![no_main]
use libfuzzer_sys::fuzz_target;
use tae_lib::formats::animation::Animation;
use tae_lib::FormatProfile;

fuzz_target!(|data: (FormatProfile, Vec<Animation>)| {
    let (profile, animations) = data;
    tae_lib_fuzz::test_write_read_write(&animations, profile);
});
