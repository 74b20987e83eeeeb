//! Extra data attached to event groups in the oldest revision of the format.
use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::{CutsceneEntityType, EventGroupDataType};
use crate::{TaeError, TaeReader, TaeWriter};

/// The data for an event group selected by the group's type.
/// Only [ApplyToSpecificCutsceneEntity](EventGroupData::ApplyToSpecificCutsceneEntity) has any fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq)]
pub enum EventGroupData {
    GroupData0,
    GroupData16,
    ApplyToSpecificCutsceneEntity(CutsceneEntity),
    GroupData192,
}

/// Restricts the events in a group to a single entity in a cutscene.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutsceneEntity {
    pub entity_type: CutsceneEntityType,
    pub entity_id_part1: i16,
    pub entity_id_part2: i16,
    pub block: i8,
    pub area: i8,
}

impl Default for CutsceneEntity {
    fn default() -> Self {
        Self {
            entity_type: CutsceneEntityType::Character,
            entity_id_part1: 0,
            entity_id_part2: 0,
            block: -1,
            area: -1,
        }
    }
}

impl CutsceneEntity {
    fn read(reader: &mut TaeReader) -> Result<Self, TaeError> {
        let entity_type = CutsceneEntityType::try_from(reader.read_u16()?)?;
        let entity_id_part1 = reader.read_i16()?;
        let entity_id_part2 = reader.read_i16()?;
        let block = reader.read_i8()?;
        let area = reader.read_i8()?;
        reader.assert_i32(0)?;
        reader.assert_i32(0)?;

        Ok(Self {
            entity_type,
            entity_id_part1,
            entity_id_part2,
            block,
            area,
        })
    }

    fn write(&self, writer: &mut TaeWriter) -> Result<(), TaeError> {
        writer.write(&self.entity_type)?;
        writer.write_i16(self.entity_id_part1)?;
        writer.write_i16(self.entity_id_part2)?;
        writer.write_i8(self.block)?;
        writer.write_i8(self.area)?;
        writer.write_i32(0)?;
        writer.write_i32(0)
    }
}

impl EventGroupData {
    /// The default data for a group type or `None` if the type has no associated data.
    /**
    ```rust
    use tae_lib::formats::group_data::EventGroupData;

    let data = EventGroupData::for_group_type(128).unwrap();
    assert_eq!(128, data.group_type());
    assert!(EventGroupData::for_group_type(5).is_none());
    ```
     */
    pub fn for_group_type(group_type: i64) -> Option<Self> {
        EventGroupDataType::try_from(group_type)
            .ok()
            .map(Self::from_data_type)
    }

    /// The event group type this data can be attached to.
    pub fn group_type(&self) -> i64 {
        self.data_type() as i64
    }

    pub fn data_type(&self) -> EventGroupDataType {
        match self {
            EventGroupData::GroupData0 => EventGroupDataType::GroupData0,
            EventGroupData::GroupData16 => EventGroupDataType::GroupData16,
            EventGroupData::ApplyToSpecificCutsceneEntity(_) => {
                EventGroupDataType::ApplyToSpecificCutsceneEntity
            }
            EventGroupData::GroupData192 => EventGroupDataType::GroupData192,
        }
    }

    fn from_data_type(data_type: EventGroupDataType) -> Self {
        match data_type {
            EventGroupDataType::GroupData0 => EventGroupData::GroupData0,
            EventGroupDataType::GroupData16 => EventGroupData::GroupData16,
            EventGroupDataType::ApplyToSpecificCutsceneEntity => {
                EventGroupData::ApplyToSpecificCutsceneEntity(CutsceneEntity::default())
            }
            EventGroupDataType::GroupData192 => EventGroupData::GroupData192,
        }
    }

    /// Reads the data offset and the inner fields for `data_type`.
    /// A data offset of 0 skips the inner fields and uses their default values.
    pub fn read(reader: &mut TaeReader, data_type: EventGroupDataType) -> Result<Self, TaeError> {
        let data_offset = reader.read_varint()?;
        if data_offset == 0 {
            return Ok(Self::from_data_type(data_type));
        }

        match data_type {
            EventGroupDataType::ApplyToSpecificCutsceneEntity => Ok(
                EventGroupData::ApplyToSpecificCutsceneEntity(CutsceneEntity::read(reader)?),
            ),
            _ => Ok(Self::from_data_type(data_type)),
        }
    }

    /// Writes the data offset followed by the inner fields.
    /// The offset is 0 if there are no inner fields.
    pub fn write(
        &self,
        writer: &mut TaeWriter,
        anim_index: usize,
        group_index: usize,
    ) -> Result<(), TaeError> {
        let key = format!("EventGroupDataOffset{}:{}", anim_index, group_index);
        writer.reserve_varint(&key)?;

        let data_start = writer.position();
        self.write_inner(writer)?;

        if writer.position() != data_start {
            writer.fill_varint(&key, data_start as i64)
        } else {
            writer.fill_varint(&key, 0)
        }
    }

    fn write_inner(&self, writer: &mut TaeWriter) -> Result<(), TaeError> {
        match self {
            EventGroupData::ApplyToSpecificCutsceneEntity(entity) => entity.write(writer),
            _ => Ok(()),
        }
    }

    /// Reads the data for `group_type` if the type has any associated data.
    pub(crate) fn read_for_group_type(
        reader: &mut TaeReader,
        group_type: i64,
    ) -> Result<Self, TaeError> {
        let data_type = EventGroupDataType::try_from(group_type)?;
        Self::read(reader, data_type)
    }
}
