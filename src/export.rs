use std::collections::HashMap;
use std::io::{Cursor, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use tae_write::TaeWrite;

use crate::strings::write_utf16;
use crate::{ReservationError, TaeError};

fn round_up(value: u64, n: u64) -> u64 {
    // Find the next largest multiple of n.
    ((value + n - 1) / n) * n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderKind {
    Int32,
    Varint,
}

#[derive(Debug, Clone, Copy)]
struct Placeholder {
    position: u64,
    kind: PlaceholderKind,
}

/// A little endian writer that builds a TAE buffer in a single forward pass.
///
/// Offsets to regions that have not been written yet are handled by reserving a
/// zeroed placeholder under a unique key and filling it once the position is known.
/// [finish](TaeWriter::finish) fails if any placeholder was never filled.
/**
```rust
use tae_lib::TaeWriter;

# fn main() -> Result<(), tae_lib::TaeError> {
let mut writer = TaeWriter::new(false);
writer.reserve_varint("DataOffset")?;
writer.write_i32(-1)?;
let position = writer.position();
writer.fill_varint("DataOffset", position as i64)?;
writer.write_u8(7)?;

assert_eq!(vec![8, 0, 0, 0, 255, 255, 255, 255, 7], writer.finish()?);
# Ok(())
# }
```
 */
#[derive(Debug)]
pub struct TaeWriter {
    cursor: Cursor<Vec<u8>>,
    varint_long: bool,
    placeholders: HashMap<String, Placeholder>,
}

impl TaeWriter {
    pub fn new(varint_long: bool) -> Self {
        Self {
            cursor: Cursor::new(Vec::new()),
            varint_long,
            placeholders: HashMap::new(),
        }
    }

    pub fn varint_long(&self) -> bool {
        self.varint_long
    }

    /// The size in bytes of a single varint.
    pub fn varint_size(&self) -> u64 {
        if self.varint_long {
            8
        } else {
            4
        }
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Writes a fixed layout value using its [TaeWrite] implementation.
    pub fn write<T: TaeWrite + ?Sized>(&mut self, value: &T) -> Result<(), TaeError> {
        value.tae_write(&mut self.cursor)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), TaeError> {
        self.cursor.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), TaeError> {
        self.cursor.write_i8(value)?;
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), TaeError> {
        self.cursor.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), TaeError> {
        self.cursor.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<(), TaeError> {
        self.cursor.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), TaeError> {
        self.cursor.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TaeError> {
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    /// Writes a 32 or 64 bit value depending on the varint size.
    pub fn write_varint(&mut self, value: i64) -> Result<(), TaeError> {
        if self.varint_long {
            self.write_i64(value)
        } else {
            self.write_i32(value as i32)
        }
    }

    /// Writes `text` as UTF-16 with an optional null terminator.
    pub fn write_utf16(&mut self, text: &str, terminate: bool) -> Result<(), TaeError> {
        write_utf16(&mut self.cursor, text, terminate)?;
        Ok(())
    }

    /// Writes zeros until the position is a multiple of `alignment`.
    pub fn pad(&mut self, alignment: u64) -> Result<(), TaeError> {
        let position = self.position();
        let padding = round_up(position, alignment) - position;
        for _ in 0..padding {
            self.write_u8(0)?;
        }
        Ok(())
    }

    /// Writes a zeroed [i32] placeholder to be filled later with [fill_i32](TaeWriter::fill_i32).
    pub fn reserve_i32(&mut self, key: &str) -> Result<(), TaeError> {
        self.reserve(key, PlaceholderKind::Int32)?;
        self.write_i32(0)
    }

    /// Writes a zeroed varint placeholder to be filled later with [fill_varint](TaeWriter::fill_varint).
    pub fn reserve_varint(&mut self, key: &str) -> Result<(), TaeError> {
        self.reserve(key, PlaceholderKind::Varint)?;
        self.write_varint(0)
    }

    pub fn fill_i32(&mut self, key: &str, value: i32) -> Result<(), TaeError> {
        let position = self.take_placeholder(key, PlaceholderKind::Int32)?;
        self.write_at(position, |w| w.write_i32(value))
    }

    pub fn fill_varint(&mut self, key: &str, value: i64) -> Result<(), TaeError> {
        let position = self.take_placeholder(key, PlaceholderKind::Varint)?;
        self.write_at(position, |w| w.write_varint(value))
    }

    /// Returns the written bytes if every placeholder was filled.
    pub fn finish(self) -> Result<Vec<u8>, TaeError> {
        if self.placeholders.is_empty() {
            Ok(self.cursor.into_inner())
        } else {
            let mut keys: Vec<_> = self.placeholders.into_keys().collect();
            keys.sort();
            Err(ReservationError::Unfilled { keys }.into())
        }
    }

    fn reserve(&mut self, key: &str, kind: PlaceholderKind) -> Result<(), ReservationError> {
        if self.placeholders.contains_key(key) {
            return Err(ReservationError::AlreadyReserved {
                key: key.to_string(),
            });
        }

        self.placeholders.insert(
            key.to_string(),
            Placeholder {
                position: self.position(),
                kind,
            },
        );
        Ok(())
    }

    fn take_placeholder(&mut self, key: &str, kind: PlaceholderKind) -> Result<u64, ReservationError> {
        let placeholder = self
            .placeholders
            .get(key)
            .copied()
            .ok_or_else(|| ReservationError::NotReserved {
                key: key.to_string(),
            })?;

        if placeholder.kind != kind {
            return Err(ReservationError::WidthMismatch {
                key: key.to_string(),
                reserved_size: self.placeholder_size(placeholder.kind),
                fill_size: self.placeholder_size(kind),
            });
        }

        self.placeholders.remove(key);
        Ok(placeholder.position)
    }

    fn placeholder_size(&self, kind: PlaceholderKind) -> u64 {
        match kind {
            PlaceholderKind::Int32 => 4,
            PlaceholderKind::Varint => self.varint_size(),
        }
    }

    fn write_at<F: FnOnce(&mut Self) -> Result<(), TaeError>>(
        &mut self,
        position: u64,
        write: F,
    ) -> Result<(), TaeError> {
        let saved_position = self.position();
        self.cursor.set_position(position);
        let result = write(self);
        self.cursor.set_position(saved_position);
        result
    }
}
