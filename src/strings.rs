use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

/// Reads a null terminated UTF-16LE string starting at `offset` in `data`.
/// Returns `None` if the string is not terminated before the end of `data`.
/// Invalid code units are replaced rather than rejected.
pub(crate) fn read_utf16_null_terminated(data: &[u8], offset: usize) -> Option<String> {
    let bytes = data.get(offset..)?;

    let mut code_units = Vec::new();
    for chunk in bytes.chunks_exact(2) {
        let unit = LittleEndian::read_u16(chunk);
        if unit == 0 {
            return Some(String::from_utf16_lossy(&code_units));
        }
        code_units.push(unit);
    }

    None
}

/// Writes `text` as UTF-16LE with an optional two byte null terminator.
pub(crate) fn write_utf16<W: Write>(writer: &mut W, text: &str, terminate: bool) -> std::io::Result<()> {
    for unit in text.encode_utf16() {
        writer.write_u16::<LittleEndian>(unit)?;
    }
    if terminate {
        writer.write_u16::<LittleEndian>(0)?;
    }
    Ok(())
}
