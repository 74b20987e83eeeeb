//! Timed events with opaque parameter data.
//!
//! An event is split into a header stored in the animation's event header table
//! and a data record containing the event type and parameters.
//! Event times are shared between all events in an animation and only stored once.
use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{TaeError, TaeReader, TaeWriter};

/// A single timed event in an [Animation](crate::formats::animation::Animation).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start_time: f32,
    pub end_time: f32,
    pub event_type: i32,
    /// The raw parameter bytes.
    /// The length is inferred from the position of the next record when reading.
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub parameters: Vec<u8>,
}

impl Event {
    pub fn new(start_time: f32, end_time: f32, event_type: i32, parameters: Vec<u8>) -> Self {
        Self {
            start_time,
            end_time,
            event_type,
            parameters,
        }
    }

    /// The size in bytes of the fields in the data record before the parameters.
    pub fn data_header_size(varint_long: bool) -> u64 {
        if varint_long {
            16
        } else {
            8
        }
    }

    /// Reads an event header and the start of its data record.
    /// The parameters are left empty, since their length isn't known yet.
    /// Returns the event and the offset of its parameters.
    pub fn read(reader: &mut TaeReader) -> Result<(Self, u64), TaeError> {
        let start_time = read_time(reader)?;
        let end_time = read_time(reader)?;
        let data_offset = reader.read_offset()?;

        let mut data = reader.step_in(data_offset);
        let event_type = data.read_i32()?;
        if data.varint_long() {
            data.assert_i32(0)?;
        }
        let parameters_offset = data.read_offset()?;

        log::trace!(
            "Event type {} at {:#x} with parameters at {:#x}",
            event_type,
            data_offset,
            parameters_offset
        );

        Ok((
            Self::new(start_time, end_time, event_type, Vec::new()),
            parameters_offset,
        ))
    }

    /// Reads `length` bytes of parameters from the current position.
    pub fn read_parameters(&mut self, reader: &mut TaeReader, length: i64) -> Result<(), TaeError> {
        let offset = reader.position();
        let length = usize::try_from(length).map_err(|_| TaeError::InvalidLength { offset, length })?;
        self.parameters = reader.read_bytes(length)?;
        Ok(())
    }

    /// Writes the offsets to the shared times and reserves the offset to the data record.
    pub fn write_header(
        &self,
        writer: &mut TaeWriter,
        anim_index: usize,
        event_index: usize,
        time_offsets: &TimeOffsets,
    ) -> Result<(), TaeError> {
        writer.write_varint(time_offsets.offset(self.start_time)? as i64)?;
        writer.write_varint(time_offsets.offset(self.end_time)? as i64)?;
        writer.reserve_varint(&data_offset_key(anim_index, event_index))
    }

    /// Writes the data record for the header written by [write_header](Event::write_header).
    pub fn write_data(
        &self,
        writer: &mut TaeWriter,
        anim_index: usize,
        event_index: usize,
    ) -> Result<(), TaeError> {
        writer.fill_varint(
            &data_offset_key(anim_index, event_index),
            writer.position() as i64,
        )?;

        writer.write_i32(self.event_type)?;
        if writer.varint_long() {
            writer.write_i32(0)?;
        }
        let parameters_offset = writer.position() + writer.varint_size();
        writer.write_varint(parameters_offset as i64)?;
        writer.write_bytes(&self.parameters)
    }
}

fn data_offset_key(anim_index: usize, event_index: usize) -> String {
    format!("EventDataOffset{}:{}", anim_index, event_index)
}

fn read_time(reader: &mut TaeReader) -> Result<f32, TaeError> {
    let position = reader.position();
    let offset = reader.read_offset()?;
    reader.get_f32(offset).ok_or(TaeError::InvalidOffset {
        offset: position,
        value: offset as i64,
    })
}

/// The position of each unique event time in an animation.
/// Times are sorted in ascending order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeOffsets {
    offsets: Vec<(f32, u64)>,
}

impl TimeOffsets {
    /// The sorted unique start and end times of `events`.
    /// Times that compare equal like `0.0` and `-0.0` are only included once.
    pub fn unique_times(events: &[Event]) -> Result<Vec<f32>, TaeError> {
        let mut times = Vec::with_capacity(events.len() * 2);
        for event in events {
            for time in [event.start_time, event.end_time] {
                if time.is_nan() {
                    return Err(TaeError::UnsupportedTime { time });
                }
                times.push(time);
            }
        }

        // NaN is already excluded, so the comparison never fails.
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        times.dedup_by(|a, b| a == b);
        Ok(times)
    }

    pub fn insert(&mut self, time: f32, offset: u64) {
        self.offsets.push((time, offset));
    }

    /// The position where `time` was written.
    pub fn offset(&self, time: f32) -> Result<u64, TaeError> {
        self.offsets
            .iter()
            .find(|(t, _)| *t == time)
            .map(|(_, offset)| *offset)
            .ok_or(TaeError::UnsupportedTime { time })
    }
}
