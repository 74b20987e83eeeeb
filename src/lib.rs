//! # tae_lib
//!
//! tae_lib is a library for reading and writing the animation records of TAE (timed animation event) files.
//! Each [Animation](formats::animation::Animation) stores a list of timed [Event](formats::event::Event) values,
//! groups of events, and a mini header describing where the motion data comes from.
//!
//! Most regions in a TAE file have no stored length.
//! The size of an event's parameters is inferred from the distance between successive offsets,
//! so reading and writing must follow the exact layout used by existing files.
//! Reading and then writing an unmodified animation produces identical bytes.
//!
//! ## Format Profiles
//! Three revisions of the format are supported, selected with a [FormatProfile].
//! The profile also decides if offsets and counts are stored as 32 bit or 64 bit "varints".
//! The profile is passed explicitly to every read and write function and must be the same for all records in a file.
//!
//! ## Example
/*!
```rust
use tae_lib::formats::animation::{read_animations, write_animations, Animation};
use tae_lib::formats::event::Event;
use tae_lib::formats::mini_header::MiniHeader;
use tae_lib::{FormatProfile, TaeFormat, TaeReader, TaeWriter};

# fn main() -> Result<(), tae_lib::TaeError> {
let profile = FormatProfile::new(TaeFormat::Ds3, true);

let mut animation = Animation::new(3000, MiniHeader::default(), "a000_003000.hkx".to_string());
animation.events.push(Event::new(0.0, 0.5, 16, vec![1, 2, 3, 4]));

let mut writer = TaeWriter::new(profile.varint_long);
write_animations(&mut writer, &[animation], profile)?;
let bytes = writer.finish()?;

let mut reader = TaeReader::new(&bytes, profile.varint_long);
let animations = read_animations(&mut reader, 1, profile)?;
assert_eq!(3000, animations[0].id);
assert_eq!(vec![1, 2, 3, 4], animations[0].events[0].parameters);
# Ok(())
# }
```
 */
pub mod enums;
pub mod formats;

mod export;
mod reader;
mod strings;

pub use export::TaeWriter;
pub use reader::{StepIn, TaeReader};

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The known revisions of the TAE format.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaeFormat {
    /// The oldest revision.
    /// Counts precede offsets and event groups may carry extra group data.
    Ds1,
    /// Event group indices are stored as varints
    /// and the group type record is followed by a self referencing offset.
    Sotfs,
    /// All later revisions.
    Ds3,
}

/// The on disk layout differences for reading and writing animation records.
/**
```rust
use tae_lib::{FormatProfile, TaeFormat};

let profile = FormatProfile::new(TaeFormat::Sotfs, true);
assert!(!profile.legacy_field_order());
assert!(profile.indices_are_variable_width());
assert_eq!(8, profile.varint_size());
```
 */
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    pub format: TaeFormat,
    /// `true` if varints are 64 bit and `false` if varints are 32 bit.
    /// This is constant for every record in a file.
    pub varint_long: bool,
}

impl FormatProfile {
    pub fn new(format: TaeFormat, varint_long: bool) -> Self {
        Self {
            format,
            varint_long,
        }
    }

    /// `true` for the oldest revision that stores counts before offsets.
    pub fn legacy_field_order(&self) -> bool {
        self.format == TaeFormat::Ds1
    }

    /// `true` if event group indices are stored as varints instead of 32 bit integers.
    pub fn indices_are_variable_width(&self) -> bool {
        self.format == TaeFormat::Sotfs
    }

    /// The size in bytes of a single varint.
    pub fn varint_size(&self) -> u64 {
        if self.varint_long {
            8
        } else {
            4
        }
    }
}

/// Errors while reading or writing TAE records.
#[derive(Debug, Error)]
pub enum TaeError {
    /// A field with a known constant value did not match.
    /// This indicates a corrupt file or an unsupported revision.
    #[error(
        "Expected a value of {} at offset {:#x} but found {}.",
        expected,
        offset,
        actual
    )]
    MalformedInput {
        offset: u64,
        expected: i64,
        actual: i64,
    },

    /// A type tag did not match any known variant.
    #[error("{} type {} is not supported.", kind, value)]
    UnsupportedVariant { kind: &'static str, value: i64 },

    /// An event group entry does not refer to any known event.
    #[error("Event group entry {:#x} does not refer to any event in the animation.", offset)]
    DanglingReference { offset: i64 },

    /// An event group index is past the end of the animation's events.
    #[error(
        "Event group index {} is out of range for {} events.",
        index,
        event_count
    )]
    EventIndexOutOfRange { index: usize, event_count: usize },

    /// The data attached to an event group is for a different group type.
    #[error(
        "Event group data for group type {} cannot be written for group type {}.",
        data_type,
        group_type
    )]
    GroupDataTypeMismatch { group_type: i64, data_type: i64 },

    /// An offset placeholder was not reserved and filled correctly.
    #[error(transparent)]
    Reservation(#[from] ReservationError),

    /// An offset points before the start of the buffer.
    #[error("Offset {} read at {:#x} is not a valid position.", value, offset)]
    InvalidOffset { offset: u64, value: i64 },

    /// A region length inferred from offsets is negative.
    #[error("Inferred length {} at offset {:#x} is negative.", length, offset)]
    InvalidLength { offset: u64, length: i64 },

    /// An event time can't be stored in the shared time table.
    #[error("Event time {} cannot be written.", time)]
    UnsupportedTime { time: f32 },

    /// An error occurred while writing data to a buffer.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error occurred while reading data from a buffer.
    #[error(transparent)]
    BinRead(#[from] binread::error::Error),
}

/// Errors from misuse of offset placeholders while writing.
/// These indicate a bug in the writing code rather than invalid data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReservationError {
    #[error("The placeholder {:?} is already reserved.", key)]
    AlreadyReserved { key: String },

    #[error("The placeholder {:?} was never reserved or has already been filled.", key)]
    NotReserved { key: String },

    #[error(
        "The placeholder {:?} has a size of {} bytes but was filled with {} bytes.",
        key,
        reserved_size,
        fill_size
    )]
    WidthMismatch {
        key: String,
        reserved_size: u64,
        fill_size: u64,
    },

    #[error("The placeholders {:?} were never filled.", keys)]
    Unfilled { keys: Vec<String> },
}

#[cfg(test)]
pub(crate) fn hex_bytes(hex: &str) -> Vec<u8> {
    // Remove any whitespace used to make the tests more readable.
    let no_whitespace: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(no_whitespace).unwrap()
}
