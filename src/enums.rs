//! Type tags stored in animation and event group records.
use std::convert::TryFrom;

use tae_write::TaeWrite;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TaeError;

/// Selects the variant of an animation's [MiniHeader](crate::formats::mini_header::MiniHeader).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, TaeWrite, Clone, Copy, PartialEq, Eq)]
#[taewrite(repr(u32))]
pub enum MiniHeaderType {
    /// Flags with an optional reference to another animation's motion data.
    Standard = 0,
    /// The animation imports all motion data and events from another animation.
    ImportOtherAnim = 1,
}

impl TryFrom<u32> for MiniHeaderType {
    type Error = TaeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            1 => Ok(Self::ImportOtherAnim),
            _ => Err(TaeError::UnsupportedVariant {
                kind: "MiniHeader",
                value: value.into(),
            }),
        }
    }
}

/// The group types with associated
/// [EventGroupData](crate::formats::group_data::EventGroupData) in the oldest format revision.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventGroupDataType {
    GroupData0 = 0,
    GroupData16 = 16,
    ApplyToSpecificCutsceneEntity = 128,
    GroupData192 = 192,
}

impl TryFrom<i64> for EventGroupDataType {
    type Error = TaeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::GroupData0),
            16 => Ok(Self::GroupData16),
            128 => Ok(Self::ApplyToSpecificCutsceneEntity),
            192 => Ok(Self::GroupData192),
            _ => Err(TaeError::UnsupportedVariant {
                kind: "EventGroupData",
                value,
            }),
        }
    }
}

/// The kind of cutscene entity targeted by an event group.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, TaeWrite, Clone, Copy, PartialEq, Eq)]
#[taewrite(repr(u16))]
pub enum CutsceneEntityType {
    Character = 0,
    Object = 1,
    MapPiece = 2,
    DummyNode = 4,
}

impl Default for CutsceneEntityType {
    fn default() -> Self {
        Self::Character
    }
}

impl TryFrom<u16> for CutsceneEntityType {
    type Error = TaeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Character),
            1 => Ok(Self::Object),
            2 => Ok(Self::MapPiece),
            4 => Ok(Self::DummyNode),
            _ => Err(TaeError::UnsupportedVariant {
                kind: "CutsceneEntity",
                value: value.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mini_header_type_from_u32() {
        assert_eq!(MiniHeaderType::Standard, MiniHeaderType::try_from(0).unwrap());
        assert_eq!(
            MiniHeaderType::ImportOtherAnim,
            MiniHeaderType::try_from(1).unwrap()
        );
        assert!(matches!(
            MiniHeaderType::try_from(2),
            Err(TaeError::UnsupportedVariant { value: 2, .. })
        ));
    }

    #[test]
    fn group_data_type_from_i64() {
        assert_eq!(
            EventGroupDataType::ApplyToSpecificCutsceneEntity,
            EventGroupDataType::try_from(128).unwrap()
        );
        assert!(EventGroupDataType::try_from(64).is_err());
    }

    #[test]
    fn cutscene_entity_type_skips_three() {
        assert_eq!(
            CutsceneEntityType::DummyNode,
            CutsceneEntityType::try_from(4).unwrap()
        );
        assert!(CutsceneEntityType::try_from(3).is_err());
    }

    #[test]
    fn write_cutscene_entity_type() {
        let mut writer = Vec::new();
        CutsceneEntityType::MapPiece.tae_write(&mut writer).unwrap();
        assert_eq!(vec![2u8, 0u8], writer);
    }
}
