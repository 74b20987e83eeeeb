use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::formats::group_data::EventGroupData;
use crate::{FormatProfile, TaeError, TaeFormat, TaeReader, TaeWriter};

/// A group of events in an animation with a type that does not necessarily match the event types.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq)]
pub struct EventGroup {
    pub group_type: i64,
    /// Additional data for the group type.
    /// This is only stored for [TaeFormat::Ds1].
    /// Groups without data don't store a data offset,
    /// so reading them back requires the following bytes to form a valid data offset.
    pub group_data: Option<EventGroupData>,
    /// Indices into the owning animation's events.
    pub indices: Vec<usize>,
}

impl EventGroup {
    /// Creates an empty group with no data.
    pub fn new(group_type: i64) -> Self {
        Self {
            group_type,
            group_data: None,
            indices: Vec::new(),
        }
    }

    /// Reads a group header and its type and index records.
    /// Stored event header offsets are converted to indices using `event_header_offsets`.
    pub fn read(
        reader: &mut TaeReader,
        event_header_offsets: &[u64],
        profile: FormatProfile,
    ) -> Result<Self, TaeError> {
        let entry_count = reader.read_varint()?;
        let values_offset = reader.read_offset()?;
        let type_offset = reader.read_offset()?;
        if !profile.legacy_field_order() {
            reader.assert_varint(0)?;
        }

        let (group_type, group_data) = {
            let mut type_reader = reader.step_in(type_offset);
            read_group_type(&mut type_reader, profile)?
        };

        log::trace!(
            "Event group type {} with {} entries at {:#x}",
            group_type,
            entry_count,
            values_offset
        );

        let entry_count = usize::try_from(entry_count).map_err(|_| TaeError::InvalidLength {
            offset: values_offset,
            length: entry_count,
        })?;

        let stored_offsets = {
            let mut values = reader.step_in(values_offset);
            if profile.indices_are_variable_width() {
                values.read_varints(entry_count)?
            } else {
                values.read_i32s(entry_count)?
            }
        };

        let indices = stored_offsets
            .into_iter()
            .map(|offset| {
                event_header_offsets
                    .iter()
                    .position(|o| *o as i64 == offset)
                    .ok_or(TaeError::DanglingReference { offset })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            group_type,
            group_data,
            indices,
        })
    }

    /// Writes the entry count and reserves the offsets for [write_data](EventGroup::write_data).
    pub fn write_header(
        &self,
        writer: &mut TaeWriter,
        anim_index: usize,
        group_index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        writer.write_varint(self.indices.len() as i64)?;
        writer.reserve_varint(&values_offset_key(anim_index, group_index))?;
        writer.reserve_varint(&type_offset_key(anim_index, group_index))?;
        if !profile.legacy_field_order() {
            writer.write_varint(0)?;
        }
        Ok(())
    }

    /// Writes the type record and the stored event header offset for each index.
    pub fn write_data(
        &self,
        writer: &mut TaeWriter,
        anim_index: usize,
        group_index: usize,
        event_header_offsets: &[u64],
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        // Check everything that can fail before writing anything.
        let group_data = match profile.format {
            TaeFormat::Ds1 => self.legacy_group_data()?,
            _ => None,
        };
        let offsets = self
            .indices
            .iter()
            .map(|i| {
                event_header_offsets
                    .get(*i)
                    .copied()
                    .ok_or(TaeError::EventIndexOutOfRange {
                        index: *i,
                        event_count: event_header_offsets.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        writer.fill_varint(
            &type_offset_key(anim_index, group_index),
            writer.position() as i64,
        )?;
        writer.write_varint(self.group_type)?;

        match profile.format {
            TaeFormat::Sotfs => {
                let position = writer.position() + writer.varint_size();
                writer.write_varint(position as i64)?;
                writer.write_varint(0)?;
                writer.write_varint(0)?;
            }
            TaeFormat::Ds3 => writer.write_varint(0)?,
            TaeFormat::Ds1 => {
                if let Some(data) = group_data {
                    data.write(writer, anim_index, group_index)?;
                }
            }
        }

        writer.fill_varint(
            &values_offset_key(anim_index, group_index),
            writer.position() as i64,
        )?;
        for offset in offsets {
            if profile.indices_are_variable_width() {
                writer.write_varint(offset as i64)?;
            } else {
                writer.write_i32(offset as i32)?;
            }
        }

        if !profile.legacy_field_order() {
            writer.pad(16)?;
        }
        Ok(())
    }

    fn legacy_group_data(&self) -> Result<Option<&EventGroupData>, TaeError> {
        match &self.group_data {
            Some(data) if data.group_type() != self.group_type => {
                Err(TaeError::GroupDataTypeMismatch {
                    group_type: self.group_type,
                    data_type: data.group_type(),
                })
            }
            data => Ok(data.as_ref()),
        }
    }
}

fn read_group_type(
    reader: &mut TaeReader,
    profile: FormatProfile,
) -> Result<(i64, Option<EventGroupData>), TaeError> {
    let group_type = reader.read_varint()?;
    match profile.format {
        TaeFormat::Sotfs => {
            let position = reader.position() + reader.varint_size();
            reader.assert_varint(position as i64)?;
            reader.assert_varint(0)?;
            reader.assert_varint(0)?;
            Ok((group_type, None))
        }
        TaeFormat::Ds3 => {
            reader.assert_varint(0)?;
            Ok((group_type, None))
        }
        TaeFormat::Ds1 => {
            let data = EventGroupData::read_for_group_type(reader, group_type)?;
            Ok((group_type, Some(data)))
        }
    }
}

fn values_offset_key(anim_index: usize, group_index: usize) -> String {
    format!("EventGroupValuesOffset{}:{}", anim_index, group_index)
}

fn type_offset_key(anim_index: usize, group_index: usize) -> String {
    format!("EventGroupTypeOffset{}:{}", anim_index, group_index)
}
