use std::io::{Cursor, Read};
use std::ops::{Deref, DerefMut};

use binread::{BinRead, BinReaderExt};
use byteorder::{ByteOrder, LittleEndian};

use crate::strings::read_utf16_null_terminated;
use crate::TaeError;

// Counts come from untrusted data, so limit the initial allocation.
pub(crate) const MAX_INITIAL_CAPACITY: usize = 1024;

/// A little endian reader over an in memory TAE buffer.
///
/// Offsets and counts are stored as "varints" that are either 32 or 64 bits
/// depending on the file. Varints are always widened to [i64] when read.
#[derive(Debug)]
pub struct TaeReader<'a> {
    cursor: Cursor<&'a [u8]>,
    varint_long: bool,
}

impl<'a> TaeReader<'a> {
    pub fn new(data: &'a [u8], varint_long: bool) -> Self {
        Self {
            cursor: Cursor::new(data),
            varint_long,
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

    pub fn len(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Moves the reader to the absolute position `offset` until the returned guard is dropped.
    /// The previous position is restored on every exit path, including early returns from errors.
    /**
    ```rust
    use tae_lib::TaeReader;

    let data = [1u8, 0, 0, 0, 2, 0, 0, 0];
    let mut reader = TaeReader::new(&data, false);
    {
        let mut inner = reader.step_in(4);
        assert_eq!(2, inner.read_i32().unwrap());
    }
    assert_eq!(0, reader.position());
    ```
     */
    pub fn step_in(&mut self, offset: u64) -> StepIn<'_, 'a> {
        let saved_position = self.cursor.position();
        self.cursor.set_position(offset);
        StepIn {
            reader: self,
            saved_position,
        }
    }

    /// Reads a fixed layout value using its [BinRead] implementation.
    pub fn read<T>(&mut self) -> Result<T, TaeError>
    where
        T: BinRead,
        T::Args: Default,
    {
        Ok(self.cursor.read_le::<T>()?)
    }

    pub fn read_i8(&mut self) -> Result<i8, TaeError> {
        self.read()
    }

    pub fn read_u16(&mut self) -> Result<u16, TaeError> {
        self.read()
    }

    pub fn read_i16(&mut self) -> Result<i16, TaeError> {
        self.read()
    }

    pub fn read_u32(&mut self) -> Result<u32, TaeError> {
        self.read()
    }

    pub fn read_i32(&mut self) -> Result<i32, TaeError> {
        self.read()
    }

    pub fn read_i64(&mut self) -> Result<i64, TaeError> {
        self.read()
    }

    pub fn read_f32(&mut self) -> Result<f32, TaeError> {
        self.read()
    }

    pub fn read_varint(&mut self) -> Result<i64, TaeError> {
        if self.varint_long {
            self.read_i64()
        } else {
            self.read_i32().map(i64::from)
        }
    }

    pub fn read_varints(&mut self, count: usize) -> Result<Vec<i64>, TaeError> {
        let mut values = Vec::with_capacity(count.min(MAX_INITIAL_CAPACITY));
        for _ in 0..count {
            values.push(self.read_varint()?);
        }
        Ok(values)
    }

    /// Reads `count` [i32] values widened to match [read_varints](TaeReader::read_varints).
    pub fn read_i32s(&mut self, count: usize) -> Result<Vec<i64>, TaeError> {
        let mut values = Vec::with_capacity(count.min(MAX_INITIAL_CAPACITY));
        for _ in 0..count {
            values.push(self.read_i32()?.into());
        }
        Ok(values)
    }

    /// Reads a varint that is used as an absolute position in the buffer.
    pub fn read_offset(&mut self) -> Result<u64, TaeError> {
        let position = self.position();
        let value = self.read_varint()?;
        u64::try_from(value).map_err(|_| TaeError::InvalidOffset {
            offset: position,
            value,
        })
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, TaeError> {
        let remaining = self.len().saturating_sub(self.position());
        if len as u64 > remaining {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        let mut bytes = vec![0u8; len];
        self.cursor.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads an [i32] and checks that it matches `expected`.
    pub fn assert_i32(&mut self, expected: i32) -> Result<(), TaeError> {
        let offset = self.position();
        let actual = self.read_i32()?;
        if actual == expected {
            Ok(())
        } else {
            Err(TaeError::MalformedInput {
                offset,
                expected: expected.into(),
                actual: actual.into(),
            })
        }
    }

    /// Reads a varint and checks that it matches `expected`.
    pub fn assert_varint(&mut self, expected: i64) -> Result<(), TaeError> {
        let offset = self.position();
        let actual = self.read_varint()?;
        if actual == expected {
            Ok(())
        } else {
            Err(TaeError::MalformedInput {
                offset,
                expected,
                actual,
            })
        }
    }

    /// Reads the [i64] at `offset` without moving the reader.
    /// Returns `None` if the value does not fit in the buffer.
    pub fn get_i64(&self, offset: u64) -> Option<i64> {
        self.get_bytes(offset, 8).map(LittleEndian::read_i64)
    }

    /// Reads the [f32] at `offset` without moving the reader.
    /// Returns `None` if the value does not fit in the buffer.
    pub fn get_f32(&self, offset: u64) -> Option<f32> {
        self.get_bytes(offset, 4).map(LittleEndian::read_f32)
    }

    /// Reads the null terminated UTF-16 string at `offset` without moving the reader.
    pub fn get_utf16(&self, offset: u64) -> Result<String, TaeError> {
        usize::try_from(offset)
            .ok()
            .and_then(|offset| read_utf16_null_terminated(self.cursor.get_ref(), offset))
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into())
    }

    fn get_bytes(&self, offset: u64, len: u64) -> Option<&'a [u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = usize::try_from(offset.checked_add(len)?).ok()?;
        let data: &'a [u8] = *self.cursor.get_ref();
        data.get(start..end)
    }
}

/// A scoped redirection of a [TaeReader] created by [TaeReader::step_in].
/// Dropping the guard moves the reader back to where it was before the redirection.
#[derive(Debug)]
pub struct StepIn<'r, 'a> {
    reader: &'r mut TaeReader<'a>,
    saved_position: u64,
}

impl<'a> Deref for StepIn<'_, 'a> {
    type Target = TaeReader<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.reader
    }
}

impl<'a> DerefMut for StepIn<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.reader
    }
}

impl Drop for StepIn<'_, '_> {
    fn drop(&mut self) {
        self.reader.cursor.set_position(self.saved_position);
    }
}
