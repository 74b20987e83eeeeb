#![no_main]
use libfuzzer_sys::fuzz_target;
use tae_lib::formats::event_group::EventGroup;
use tae_lib::{FormatProfile, TaeReader};

fuzz_target!(|input: (FormatProfile, Vec<u64>, &[u8])| {
    // Test that this doesn't panic on errors.
    let (profile, event_header_offsets, data) = input;
    let mut reader = TaeReader::new(data, profile.varint_long);
    let _result = EventGroup::read(&mut reader, &event_header_offsets, profile);
});
