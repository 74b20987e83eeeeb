//! The mini header describes where an animation's motion data comes from.
use binread::BinRead;
use tae_write::TaeWrite;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::MiniHeaderType;
use crate::{TaeError, TaeReader, TaeWriter};

/// The variant specific data stored in an animation's file region.
/// Each animation has exactly one mini header.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq)]
pub enum MiniHeader {
    Standard(StandardMiniHeader),
    ImportOtherAnim(ImportOtherAnimMiniHeader),
}

impl Default for MiniHeader {
    fn default() -> Self {
        Self::Standard(StandardMiniHeader::default())
    }
}

impl MiniHeader {
    /// The type tag stored before the inner fields.
    pub fn mini_header_type(&self) -> MiniHeaderType {
        match self {
            MiniHeader::Standard(_) => MiniHeaderType::Standard,
            MiniHeader::ImportOtherAnim(_) => MiniHeaderType::ImportOtherAnim,
        }
    }

    /// Reads the inner fields for the variant selected by `mini_header_type`.
    pub fn read_inner(
        reader: &mut TaeReader,
        mini_header_type: MiniHeaderType,
    ) -> Result<Self, TaeError> {
        match mini_header_type {
            MiniHeaderType::Standard => Ok(MiniHeader::Standard(reader.read()?)),
            MiniHeaderType::ImportOtherAnim => Ok(MiniHeader::ImportOtherAnim(reader.read()?)),
        }
    }

    pub fn write_inner(&self, writer: &mut TaeWriter) -> Result<(), TaeError> {
        match self {
            MiniHeader::Standard(inner) => writer.write(inner),
            MiniHeader::ImportOtherAnim(inner) => writer.write(inner),
        }
    }
}

/// Flags for a standalone animation, optionally borrowing motion data from another animation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(BinRead, TaeWrite, Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardMiniHeader {
    /// Loops the animation when it isn't controlled by another system.
    #[br(map = |x: u8| x != 0)]
    pub is_loop_by_default: bool,

    /// Use the motion data from [import_hkx_source_anim_id](#structfield.import_hkx_source_anim_id).
    #[br(map = |x: u8| x != 0)]
    pub imports_hkx: bool,

    /// Allows loading from delay load archives.
    #[br(map = |x: u8| x != 0, pad_after = 1)]
    #[taewrite(pad_after = 1)]
    pub allow_delay_load: bool,

    pub import_hkx_source_anim_id: i32,
}

/// Imports the motion data and all events from another animation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(BinRead, TaeWrite, Debug, Clone, PartialEq, Eq)]
pub struct ImportOtherAnimMiniHeader {
    pub import_from_anim_id: i32,
    pub unknown: i32,
}

impl Default for ImportOtherAnimMiniHeader {
    fn default() -> Self {
        Self {
            import_from_anim_id: 0,
            unknown: -1,
        }
    }
}
