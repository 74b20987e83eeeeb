use tae_lib::formats::animation::{read_animations, write_animations, Animation};
use tae_lib::{FormatProfile, TaeError, TaeReader, TaeWriter};

fn write(animations: &[Animation], profile: FormatProfile) -> Result<Vec<u8>, TaeError> {
    let mut writer = TaeWriter::new(profile.varint_long);
    write_animations(&mut writer, animations, profile)?;
    writer.finish()
}

fn read(data: &[u8], count: usize, profile: FormatProfile) -> Result<Vec<Animation>, TaeError> {
    let mut reader = TaeReader::new(data, profile.varint_long);
    read_animations(&mut reader, count, profile)
}

pub fn test_write_read_write(input: &[Animation], profile: FormatProfile) {
    // Invalid times, indices, or group data can't be written.
    let initial = match write(input, profile) {
        Ok(initial) => initial,
        Err(_) => return,
    };

    // Legacy groups without data don't store a data offset and may not read back at all.
    let first = match read(&initial, input.len(), profile) {
        Ok(first) => first,
        Err(_) => return,
    };

    // Unnamed animations may not read back identically,
    // so compare starting from the first values read from the file.
    let before = write(&first, profile).unwrap();

    let second = read(&before, first.len(), profile).unwrap();
    let after = write(&second, profile).unwrap();

    assert_eq!(before, after, "{}", serde_json::to_string(&input).unwrap());
}
