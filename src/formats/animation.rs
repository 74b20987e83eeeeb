//! Animation records and the passes used to write them.
//!
//! An animation is stored as a small header containing the ID and an offset to the body.
//! The body contains offsets to the event headers, event groups, shared event times,
//! and the anim file region containing the [MiniHeader] and file name.
//! None of the variable sized regions store their length,
//! so event parameter lengths are inferred from the offsets of the following records.
//!
//! Writing is split into passes, since files with multiple animations interleave the regions.
//! Use [write_animations] to write all the passes in the expected order.
use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::enums::MiniHeaderType;
use crate::formats::event::{Event, TimeOffsets};
use crate::formats::event_group::EventGroup;
use crate::formats::mini_header::MiniHeader;
use crate::reader::MAX_INITIAL_CAPACITY;
use crate::{FormatProfile, TaeError, TaeReader, TaeWriter};

/// The events and metadata for a single animation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub id: i64,
    /// The events in the order they are stored.
    /// [EventGroup] indices refer to positions in this list.
    pub events: Vec<Event>,
    pub event_groups: Vec<EventGroup>,
    pub mini_header: MiniHeader,
    /// The animation file name or an empty string if no name is stored.
    pub file_name: String,
}

/// The result of [Animation::read].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAnimation {
    pub animation: Animation,
    /// `true` if the last event's parameters could not be read
    /// because the animation has no event groups to mark the end of the parameters.
    /// See [Animation::read_last_event_parameters].
    pub last_event_needs_parameters: bool,
    /// The start of the anim file region.
    pub anim_file_offset: u64,
    /// The parameter offset for the last event.
    /// This is only set if [last_event_needs_parameters](#structfield.last_event_needs_parameters) is `true`.
    pub last_event_parameters_offset: u64,
}

// Offsets and counts from the animation body.
#[derive(Debug)]
struct AnimationBody {
    event_count: usize,
    event_headers_offset: u64,
    event_group_count: usize,
    event_groups_offset: u64,
    times_offset: u64,
    anim_file_offset: u64,
}

impl AnimationBody {
    fn read(reader: &mut TaeReader, profile: FormatProfile) -> Result<Self, TaeError> {
        if profile.legacy_field_order() {
            let event_count = read_count(reader)?;
            let event_headers_offset = reader.read_offset()?;
            let event_group_count = read_count(reader)?;
            let event_groups_offset = reader.read_offset()?;
            // The times count is recalculated when writing.
            reader.read_i32()?;
            let times_offset = reader.read_offset()?;
            let anim_file_offset = reader.read_offset()?;

            Ok(Self {
                event_count,
                event_headers_offset,
                event_group_count,
                event_groups_offset,
                times_offset,
                anim_file_offset,
            })
        } else {
            let event_headers_offset = reader.read_offset()?;
            let event_groups_offset = reader.read_offset()?;
            let times_offset = reader.read_offset()?;
            let anim_file_offset = reader.read_offset()?;
            let event_count = read_count(reader)?;
            let event_group_count = read_count(reader)?;
            reader.read_i32()?;
            reader.assert_i32(0)?;

            Ok(Self {
                event_count,
                event_headers_offset,
                event_group_count,
                event_groups_offset,
                times_offset,
                anim_file_offset,
            })
        }
    }
}

fn read_count(reader: &mut TaeReader) -> Result<usize, TaeError> {
    let offset = reader.position();
    let count = reader.read_i32()?;
    usize::try_from(count).map_err(|_| TaeError::InvalidLength {
        offset,
        length: count.into(),
    })
}

fn count_to_i32(count: usize, offset: u64) -> Result<i32, TaeError> {
    i32::try_from(count).map_err(|_| TaeError::InvalidLength {
        offset,
        length: i64::try_from(count).unwrap_or(i64::MAX),
    })
}

fn write_count(writer: &mut TaeWriter, count: usize) -> Result<(), TaeError> {
    let count = count_to_i32(count, writer.position())?;
    writer.write_i32(count)
}

impl Animation {
    /// Creates an animation with no events or event groups.
    pub fn new(id: i64, mini_header: MiniHeader, file_name: String) -> Self {
        Self {
            id,
            events: Vec::new(),
            event_groups: Vec::new(),
            mini_header,
            file_name,
        }
    }

    /// Reads the animation header at the current position and the body it points to.
    /// The reader is left at the end of the animation header.
    ///
    /// The last event's parameters can only be read if the animation has event groups.
    /// Otherwise the parameters are left empty and
    /// [last_event_needs_parameters](DecodedAnimation::last_event_needs_parameters) is set.
    pub fn read(reader: &mut TaeReader, profile: FormatProfile) -> Result<DecodedAnimation, TaeError> {
        let id = reader.read_varint()?;
        let offset = reader.read_offset()?;

        let mut reader = reader.step_in(offset);
        let body = AnimationBody::read(&mut reader, profile)?;
        log::trace!("Animation {} body at {:#x}: {:?}", id, offset, body);

        let (mut events, event_header_offsets, parameter_offsets) = read_events(&mut reader, &body)?;

        let mut last_event_needs_parameters = false;
        let mut last_event_parameters_offset = 0;
        if let (Some(last_event), Some(parameters_offset)) =
            (events.last_mut(), parameter_offsets.last().copied())
        {
            if body.event_groups_offset == 0 {
                log::debug!(
                    "Deferring parameters for the last event of animation {} at {:#x}",
                    id,
                    parameters_offset
                );
                last_event_needs_parameters = true;
                last_event_parameters_offset = parameters_offset;
            } else {
                let length = body.event_groups_offset as i64 - parameters_offset as i64;
                let mut parameters = reader.step_in(parameters_offset);
                last_event.read_parameters(&mut parameters, length)?;
            }
        }

        let event_groups = {
            let mut groups = reader.step_in(body.event_groups_offset);
            let mut event_groups =
                Vec::with_capacity(body.event_group_count.min(MAX_INITIAL_CAPACITY));
            for _ in 0..body.event_group_count {
                event_groups.push(EventGroup::read(&mut groups, &event_header_offsets, profile)?);
            }
            event_groups
        };

        let (mini_header, file_name) = {
            let mut anim_file = reader.step_in(body.anim_file_offset);
            read_anim_file(&mut anim_file, profile, body.times_offset)?
        };

        Ok(DecodedAnimation {
            animation: Self {
                id,
                events,
                event_groups,
                mini_header,
                file_name,
            },
            last_event_needs_parameters,
            anim_file_offset: body.anim_file_offset,
            last_event_parameters_offset,
        })
    }

    /// Reads the parameters for the last event using `end_offset` to calculate the length.
    /// This should only be called if [Animation::read] set
    /// [last_event_needs_parameters](DecodedAnimation::last_event_needs_parameters).
    pub fn read_last_event_parameters(
        &mut self,
        reader: &mut TaeReader,
        end_offset: u64,
        parameters_offset: u64,
    ) -> Result<(), TaeError> {
        if let Some(last_event) = self.events.last_mut() {
            let length = end_offset as i64 - parameters_offset as i64;
            log::debug!(
                "Reading {} bytes of deferred parameters for animation {} at {:#x}",
                length,
                self.id,
                parameters_offset
            );

            let mut parameters = reader.step_in(parameters_offset);
            last_event.read_parameters(&mut parameters, length)?;
        }
        Ok(())
    }

    /// Writes the ID and reserves the offset for [write_body](Animation::write_body).
    pub fn write_header(&self, writer: &mut TaeWriter, index: usize) -> Result<(), TaeError> {
        writer.write_varint(self.id)?;
        writer.reserve_varint(&format!("AnimationOffset{}", index))
    }

    /// Writes the counts and reserves the offsets for the remaining regions.
    pub fn write_body(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        writer.fill_varint(&format!("AnimationOffset{}", index), writer.position() as i64)?;

        if profile.legacy_field_order() {
            write_count(writer, self.events.len())?;
            writer.reserve_varint(&format!("EventHeadersOffset{}", index))?;
            write_count(writer, self.event_groups.len())?;
            writer.reserve_varint(&format!("EventGroupHeadersOffset{}", index))?;
            writer.reserve_i32(&format!("TimesCount{}", index))?;
            writer.reserve_varint(&format!("TimesOffset{}", index))?;
            writer.reserve_varint(&format!("AnimFileOffset{}", index))?;
        } else {
            writer.reserve_varint(&format!("EventHeadersOffset{}", index))?;
            writer.reserve_varint(&format!("EventGroupHeadersOffset{}", index))?;
            writer.reserve_varint(&format!("TimesOffset{}", index))?;
            writer.reserve_varint(&format!("AnimFileOffset{}", index))?;
            write_count(writer, self.events.len())?;
            write_count(writer, self.event_groups.len())?;
            writer.reserve_i32(&format!("TimesCount{}", index))?;
            writer.write_i32(0)?;
        }
        Ok(())
    }

    /// Writes the [MiniHeader] and the file name.
    pub fn write_anim_file(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        writer.fill_varint(&format!("AnimFileOffset{}", index), writer.position() as i64)?;

        // The type is a varint with the upper bits always zero.
        writer.write(&self.mini_header.mini_header_type())?;
        if writer.varint_long() {
            writer.write_i32(0)?;
        }
        let inner_offset = writer.position() + writer.varint_size();
        writer.write_varint(inner_offset as i64)?;

        let file_name_key = format!("AnimFileNameOffset{}", index);
        writer.reserve_varint(&file_name_key)?;

        self.mini_header.write_inner(writer)?;

        writer.write_varint(0)?;
        if !profile.legacy_field_order()
            || self.mini_header.mini_header_type() == MiniHeaderType::ImportOtherAnim
        {
            writer.write_varint(0)?;
        }

        writer.fill_varint(&file_name_key, writer.position() as i64)?;
        if !self.file_name.is_empty() {
            writer.write_utf16(&self.file_name, true)?;
            if !profile.legacy_field_order() {
                writer.pad(16)?;
            }
        }
        Ok(())
    }

    /// Writes each unique event time once.
    /// Returns the position of each time for [write_event_headers](Animation::write_event_headers).
    pub fn write_times(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<TimeOffsets, TaeError> {
        let times = TimeOffsets::unique_times(&self.events)?;

        let times_count = count_to_i32(times.len(), writer.position())?;
        writer.fill_i32(&format!("TimesCount{}", index), times_count)?;
        let times_offset = if times.is_empty() {
            0
        } else {
            writer.position()
        };
        writer.fill_varint(&format!("TimesOffset{}", index), times_offset as i64)?;

        let mut time_offsets = TimeOffsets::default();
        for time in times {
            time_offsets.insert(time, writer.position());
            writer.write_f32(time)?;
        }

        if !profile.legacy_field_order() {
            writer.pad(16)?;
        }
        Ok(time_offsets)
    }

    /// Writes the header for each event.
    /// Returns the position of each header for [write_event_group_data](Animation::write_event_group_data).
    pub fn write_event_headers(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        time_offsets: &TimeOffsets,
    ) -> Result<Vec<u64>, TaeError> {
        let key = format!("EventHeadersOffset{}", index);
        if self.events.is_empty() {
            writer.fill_varint(&key, 0)?;
            return Ok(Vec::new());
        }

        writer.fill_varint(&key, writer.position() as i64)?;
        let mut event_header_offsets = Vec::with_capacity(self.events.len());
        for (i, event) in self.events.iter().enumerate() {
            event_header_offsets.push(writer.position());
            event.write_header(writer, index, i, time_offsets)?;
        }
        Ok(event_header_offsets)
    }

    pub fn write_event_data(&self, writer: &mut TaeWriter, index: usize) -> Result<(), TaeError> {
        for (i, event) in self.events.iter().enumerate() {
            event.write_data(writer, index, i)?;
        }
        Ok(())
    }

    pub fn write_event_group_headers(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        let key = format!("EventGroupHeadersOffset{}", index);
        if self.event_groups.is_empty() {
            return writer.fill_varint(&key, 0);
        }

        writer.fill_varint(&key, writer.position() as i64)?;
        for (i, group) in self.event_groups.iter().enumerate() {
            group.write_header(writer, index, i, profile)?;
        }
        Ok(())
    }

    pub fn write_event_group_data(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        event_header_offsets: &[u64],
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        for (i, group) in self.event_groups.iter().enumerate() {
            group.write_data(writer, index, i, event_header_offsets, profile)?;
        }
        Ok(())
    }

    /// Writes every region after the body in order.
    pub fn write_regions(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        self.write_anim_file(writer, index, profile)?;
        let time_offsets = self.write_times(writer, index, profile)?;
        let event_header_offsets = self.write_event_headers(writer, index, &time_offsets)?;
        self.write_event_data(writer, index)?;
        self.write_event_group_headers(writer, index, profile)?;
        self.write_event_group_data(writer, index, &event_header_offsets, profile)
    }

    /// Writes a single animation with all of its passes.
    /// Use [write_animations] for multiple animations.
    pub fn write(
        &self,
        writer: &mut TaeWriter,
        index: usize,
        profile: FormatProfile,
    ) -> Result<(), TaeError> {
        self.write_header(writer, index)?;
        self.write_body(writer, index, profile)?;
        self.write_regions(writer, index, profile)
    }
}

fn read_events(
    reader: &mut TaeReader,
    body: &AnimationBody,
) -> Result<(Vec<Event>, Vec<u64>, Vec<u64>), TaeError> {
    let capacity = body.event_count.min(MAX_INITIAL_CAPACITY);
    let mut events: Vec<Event> = Vec::with_capacity(capacity);
    let mut event_header_offsets = Vec::with_capacity(capacity);
    let mut parameter_offsets: Vec<u64> = Vec::with_capacity(capacity);

    let header_size = Event::data_header_size(reader.varint_long()) as i64;

    let mut headers = reader.step_in(body.event_headers_offset);
    for _ in 0..body.event_count {
        event_header_offsets.push(headers.position());
        let (event, parameters_offset) = Event::read(&mut headers)?;

        // The previous event's parameters end where this event's data record starts.
        if let (Some(previous), Some(previous_offset)) =
            (events.last_mut(), parameter_offsets.last().copied())
        {
            let length = (parameters_offset as i64 - previous_offset as i64).saturating_sub(header_size);
            let mut parameters = headers.step_in(previous_offset);
            previous.read_parameters(&mut parameters, length)?;
        }

        events.push(event);
        parameter_offsets.push(parameters_offset);
    }

    Ok((events, event_header_offsets, parameter_offsets))
}

fn read_anim_file(
    reader: &mut TaeReader,
    profile: FormatProfile,
    times_offset: u64,
) -> Result<(MiniHeader, String), TaeError> {
    let mini_header_type = MiniHeaderType::try_from(reader.read_u32()?)?;
    if reader.varint_long() {
        reader.assert_i32(0)?;
    }
    let inner_offset = reader.position() + reader.varint_size();
    reader.assert_varint(inner_offset as i64)?;
    let file_name_offset = reader.read_varint()?;

    let mini_header = MiniHeader::read_inner(reader, mini_header_type)?;

    reader.assert_varint(0)?;
    if !profile.legacy_field_order() || mini_header_type == MiniHeaderType::ImportOtherAnim {
        reader.assert_varint(0)?;
    }

    let file_name = read_file_name(reader, file_name_offset, times_offset)?;
    Ok((mini_header, file_name))
}

// Animations without a name still store an offset.
// Skip offsets that point to the times or other non string data.
fn read_file_name(
    reader: &TaeReader,
    file_name_offset: i64,
    times_offset: u64,
) -> Result<String, TaeError> {
    let offset = match u64::try_from(file_name_offset) {
        Ok(offset) if offset < reader.len() && offset != times_offset => offset,
        _ => return Ok(String::new()),
    };

    if reader.get_i64(offset) == Some(1) {
        return Ok(String::new());
    }

    match reader.get_f32(offset) {
        Some(value) if (0.016667..=100.0).contains(&value) => Ok(String::new()),
        _ => reader.get_utf16(offset),
    }
}

/// Reads `count` consecutive animation headers starting at the current position.
/// Deferred event parameters are read using the anim file offset of the next animation
/// or the end of the buffer for the final animation.
/**
```rust
use tae_lib::formats::animation::{read_animations, write_animations, Animation};
use tae_lib::formats::event::Event;
use tae_lib::formats::mini_header::MiniHeader;
use tae_lib::{FormatProfile, TaeFormat, TaeReader, TaeWriter};

# fn main() -> Result<(), tae_lib::TaeError> {
let profile = FormatProfile::new(TaeFormat::Ds1, false);

let mut a0 = Animation::new(0, MiniHeader::default(), "a00.hkx".to_string());
a0.events.push(Event::new(0.0, 1.0, 0, vec![1, 2]));
let mut a1 = Animation::new(1, MiniHeader::default(), "a01.hkx".to_string());
a1.events.push(Event::new(0.0, 2.0, 1, vec![3]));

let mut writer = TaeWriter::new(profile.varint_long);
write_animations(&mut writer, &[a0.clone(), a1.clone()], profile)?;
let bytes = writer.finish()?;

let mut reader = TaeReader::new(&bytes, profile.varint_long);
assert_eq!(vec![a0, a1], read_animations(&mut reader, 2, profile)?);
# Ok(())
# }
```
 */
pub fn read_animations(
    reader: &mut TaeReader,
    count: usize,
    profile: FormatProfile,
) -> Result<Vec<Animation>, TaeError> {
    let mut animations: Vec<Animation> = Vec::with_capacity(count.min(MAX_INITIAL_CAPACITY));
    let mut pending_parameters_offset = None;

    for _ in 0..count {
        let decoded = Animation::read(reader, profile)?;

        if let (Some(parameters_offset), Some(previous)) =
            (pending_parameters_offset.take(), animations.last_mut())
        {
            previous.read_last_event_parameters(
                reader,
                decoded.anim_file_offset,
                parameters_offset,
            )?;
        }

        if decoded.last_event_needs_parameters {
            pending_parameters_offset = Some(decoded.last_event_parameters_offset);
        }
        animations.push(decoded.animation);
    }

    if let (Some(parameters_offset), Some(last)) = (pending_parameters_offset, animations.last_mut()) {
        let end_offset = reader.len();
        last.read_last_event_parameters(reader, end_offset, parameters_offset)?;
    }

    Ok(animations)
}

/// Writes all the animation headers followed by the bodies and remaining regions for each animation.
pub fn write_animations(
    writer: &mut TaeWriter,
    animations: &[Animation],
    profile: FormatProfile,
) -> Result<(), TaeError> {
    for (i, animation) in animations.iter().enumerate() {
        animation.write_header(writer, i)?;
    }
    for (i, animation) in animations.iter().enumerate() {
        animation.write_body(writer, i, profile)?;
    }
    for (i, animation) in animations.iter().enumerate() {
        animation.write_regions(writer, i, profile)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::group_data::EventGroupData;
    use crate::formats::mini_header::{ImportOtherAnimMiniHeader, StandardMiniHeader};
    use crate::{hex_bytes, TaeFormat};
    use pretty_assertions::assert_eq;

    fn all_profiles() -> Vec<FormatProfile> {
        let mut profiles = Vec::new();
        for format in [TaeFormat::Ds1, TaeFormat::Sotfs, TaeFormat::Ds3] {
            for varint_long in [false, true] {
                profiles.push(FormatProfile::new(format, varint_long));
            }
        }
        profiles
    }

    fn write_bytes(animations: &[Animation], profile: FormatProfile) -> Vec<u8> {
        let mut writer = TaeWriter::new(profile.varint_long);
        write_animations(&mut writer, animations, profile).unwrap();
        writer.finish().unwrap()
    }

    fn read_bytes(bytes: &[u8], count: usize, profile: FormatProfile) -> Vec<Animation> {
        let mut reader = TaeReader::new(bytes, profile.varint_long);
        read_animations(&mut reader, count, profile).unwrap()
    }

    fn le_hex(value: u32) -> String {
        hex::encode(value.to_le_bytes())
    }

    // A single 32 bit animation with no events and a Standard mini header.
    // The data after the anim file region starts at 0x44.
    fn anim_file_buffer(times_offset: u32, file_name_offset: u32, tail: &str) -> Vec<u8> {
        hex_bytes(&format!(
            "E8030000 08000000
             00000000 00000000 {} 28000000 00000000 00000000 00000000 00000000
             00000000 30000000 {} 01000000 00000000 00000000 00000000
             {}",
            le_hex(times_offset),
            le_hex(file_name_offset),
            tail
        ))
    }

    fn read_file_name_from(data: &[u8]) -> String {
        let mut reader = TaeReader::new(data, false);
        let decoded = Animation::read(&mut reader, FormatProfile::new(TaeFormat::Ds3, false)).unwrap();
        decoded.animation.file_name
    }

    fn end_to_end_animation(profile: FormatProfile) -> Animation {
        let group_data = if profile.legacy_field_order() {
            Some(EventGroupData::GroupData16)
        } else {
            None
        };

        Animation {
            id: 1000,
            events: vec![
                Event::new(0.0, 1.0, 0, vec![1, 2, 3, 4]),
                Event::new(1.0, 2.0, 1, vec![5, 6, 7, 8]),
            ],
            event_groups: vec![EventGroup {
                group_type: 16,
                group_data,
                indices: vec![0, 1],
            }],
            mini_header: MiniHeader::Standard(StandardMiniHeader {
                is_loop_by_default: true,
                ..Default::default()
            }),
            file_name: String::new(),
        }
    }

    // Read the stored times using the offsets in the body.
    fn stored_times(bytes: &[u8], profile: FormatProfile) -> Vec<f32> {
        let mut reader = TaeReader::new(bytes, profile.varint_long);
        reader.read_varint().unwrap();
        let offset = reader.read_offset().unwrap();
        let mut body = reader.step_in(offset);

        let (times_count, times_offset) = if profile.legacy_field_order() {
            body.read_i32().unwrap();
            body.read_varint().unwrap();
            body.read_i32().unwrap();
            body.read_varint().unwrap();
            let count = body.read_i32().unwrap();
            (count, body.read_offset().unwrap())
        } else {
            body.read_varint().unwrap();
            body.read_varint().unwrap();
            let times_offset = body.read_offset().unwrap();
            body.read_varint().unwrap();
            body.read_i32().unwrap();
            body.read_i32().unwrap();
            (body.read_i32().unwrap(), times_offset)
        };

        let mut times = body.step_in(times_offset);
        (0..times_count).map(|_| times.read_f32().unwrap()).collect()
    }

    #[test]
    fn write_ds3_32bit() {
        let mut animation = Animation::new(1, MiniHeader::default(), String::new());
        animation
            .events
            .push(Event::new(0.0, 1.0, 5, vec![0xAA, 0xBB, 0xCC, 0xDD]));

        let mut writer = TaeWriter::new(false);
        animation
            .write(&mut writer, 0, FormatProfile::new(TaeFormat::Ds3, false))
            .unwrap();

        assert_eq!(
            hex_bytes(
                "01000000 08000000
                 50000000 00000000 44000000 28000000 01000000 00000000 02000000 00000000
                 00000000 30000000 44000000 00000000 00000000 00000000 00000000
                 00000000 0000803F 00000000
                 44000000 48000000 5C000000
                 05000000 64000000 AABBCCDD"
            ),
            writer.finish().unwrap()
        );
    }

    #[test]
    fn read_ds3_32bit_deferred_parameters() {
        let data = hex_bytes(
            "01000000 08000000
             50000000 00000000 44000000 28000000 01000000 00000000 02000000 00000000
             00000000 30000000 44000000 00000000 00000000 00000000 00000000
             00000000 0000803F 00000000
             44000000 48000000 5C000000
             05000000 64000000 AABBCCDD",
        );
        let profile = FormatProfile::new(TaeFormat::Ds3, false);

        let mut reader = TaeReader::new(&data, false);
        let mut decoded = Animation::read(&mut reader, profile).unwrap();
        assert_eq!(8, reader.position());

        assert!(decoded.last_event_needs_parameters);
        assert_eq!(0x64, decoded.last_event_parameters_offset);
        assert_eq!(0x28, decoded.anim_file_offset);
        assert_eq!(
            vec![Event::new(0.0, 1.0, 5, Vec::new())],
            decoded.animation.events
        );

        decoded
            .animation
            .read_last_event_parameters(&mut reader, data.len() as u64, 0x64)
            .unwrap();

        assert_eq!(
            Animation {
                id: 1,
                events: vec![Event::new(0.0, 1.0, 5, vec![0xAA, 0xBB, 0xCC, 0xDD])],
                event_groups: Vec::new(),
                mini_header: MiniHeader::default(),
                file_name: String::new()
            },
            decoded.animation
        );
        assert_eq!(8, reader.position());
    }

    #[test]
    fn parameter_lengths_from_offsets() {
        for profile in all_profiles() {
            let mut animation = Animation::new(5, MiniHeader::default(), "a.hkx".to_string());
            animation.events = vec![
                Event::new(0.0, 0.5, 0, vec![1; 12]),
                Event::new(0.5, 1.0, 1, Vec::new()),
                Event::new(0.0, 1.0, 2, vec![2; 3]),
            ];
            animation.event_groups.push(EventGroup {
                group_type: 0,
                group_data: if profile.legacy_field_order() {
                    Some(EventGroupData::GroupData0)
                } else {
                    None
                },
                indices: vec![2],
            });

            let bytes = write_bytes(&[animation.clone()], profile);

            let mut reader = TaeReader::new(&bytes, profile.varint_long);
            let decoded = Animation::read(&mut reader, profile).unwrap();
            assert!(!decoded.last_event_needs_parameters);
            assert_eq!(animation, decoded.animation, "{:?}", profile);
        }
    }

    #[test]
    fn events_without_groups_defer_last_parameters() {
        for profile in all_profiles() {
            let mut animation = Animation::new(5, MiniHeader::default(), String::new());
            animation.events = vec![
                Event::new(0.0, 0.5, 0, vec![1, 2]),
                Event::new(0.5, 1.0, 1, vec![3, 4, 5]),
            ];

            let bytes = write_bytes(&[animation.clone()], profile);

            let mut reader = TaeReader::new(&bytes, profile.varint_long);
            let decoded = Animation::read(&mut reader, profile).unwrap();
            assert!(decoded.last_event_needs_parameters);
            // The last event's parameters end the buffer.
            assert_eq!(
                bytes.len() as u64 - 3,
                decoded.last_event_parameters_offset
            );
            assert_eq!(vec![1, 2], decoded.animation.events[0].parameters);
            assert!(decoded.animation.events[1].parameters.is_empty());
        }
    }

    #[test]
    fn no_events_no_deferred_parameters() {
        for profile in all_profiles() {
            let animation = Animation::new(5, MiniHeader::default(), "a.hkx".to_string());
            let bytes = write_bytes(&[animation.clone()], profile);

            let mut reader = TaeReader::new(&bytes, profile.varint_long);
            let decoded = Animation::read(&mut reader, profile).unwrap();
            assert!(!decoded.last_event_needs_parameters);
            assert_eq!(0, decoded.last_event_parameters_offset);
            assert_eq!(animation, decoded.animation);
        }
    }

    #[test]
    fn end_to_end_times_stored_once() {
        for profile in all_profiles() {
            let animation = end_to_end_animation(profile);
            let bytes = write_bytes(&[animation.clone()], profile);

            assert_eq!(vec![0.0, 1.0, 2.0], stored_times(&bytes, profile));
            assert_eq!(vec![animation], read_bytes(&bytes, 1, profile));
        }
    }

    #[test]
    fn write_read_write_identical_bytes() {
        for profile in all_profiles() {
            let mut a0 = end_to_end_animation(profile);
            a0.file_name = "a000_001000.hkx".to_string();

            let mut a1 = Animation::new(
                2000,
                MiniHeader::ImportOtherAnim(ImportOtherAnimMiniHeader {
                    import_from_anim_id: 1000,
                    unknown: -1,
                }),
                "a000_002000.hkx".to_string(),
            );
            a1.events.push(Event::new(0.25, 0.5, 3, vec![9; 8]));

            let a2 = Animation::new(3000, MiniHeader::default(), "a000_003000.hkx".to_string());

            let animations = vec![a0, a1, a2];
            let bytes = write_bytes(&animations, profile);
            let decoded = read_bytes(&bytes, animations.len(), profile);
            assert_eq!(animations, decoded);
            assert_eq!(bytes, write_bytes(&decoded, profile));
        }
    }

    #[test]
    fn deferred_parameters_end_at_next_anim_file() {
        for profile in all_profiles() {
            let mut a0 = Animation::new(0, MiniHeader::default(), "a0.hkx".to_string());
            a0.events.push(Event::new(0.0, 1.0, 0, vec![1, 2, 3]));
            let mut a1 = Animation::new(1, MiniHeader::default(), "a1.hkx".to_string());
            a1.events.push(Event::new(0.0, 1.0, 0, vec![4, 5]));

            let animations = vec![a0, a1];
            let bytes = write_bytes(&animations, profile);
            assert_eq!(animations, read_bytes(&bytes, 2, profile));
        }
    }

    #[test]
    fn file_name_string() {
        let data = anim_file_buffer(0, 0x44, "61002E0068006B007800 0000");
        assert_eq!("a.hkx", read_file_name_from(&data));
    }

    #[test]
    fn file_name_int64_one() {
        let data = anim_file_buffer(0, 0x44, "01000000 00000000");
        assert_eq!("", read_file_name_from(&data));
    }

    #[test]
    fn file_name_frame_time_float() {
        // 0.0333
        let data = anim_file_buffer(0, 0x44, "9565083D 00000000");
        assert_eq!("", read_file_name_from(&data));
    }

    #[test]
    fn file_name_float_out_of_range() {
        // 0.01 is too small to be a frame time, so the bytes are read as a string.
        let data = anim_file_buffer(0, 0x44, "0AD7233C 0000");
        assert_eq!("\u{D70A}\u{3C23}", read_file_name_from(&data));
    }

    #[test]
    fn file_name_offset_is_times_offset() {
        let data = anim_file_buffer(0x44, 0x44, "61000000");
        assert_eq!("", read_file_name_from(&data));
    }

    #[test]
    fn file_name_offset_past_end() {
        let data = anim_file_buffer(0, 0x100, "");
        assert_eq!("", read_file_name_from(&data));
    }

    #[test]
    fn file_name_offset_at_end() {
        let data = anim_file_buffer(0, 0x44, "");
        assert_eq!("", read_file_name_from(&data));
    }

    #[test]
    fn read_unsupported_mini_header() {
        let data = hex_bytes(
            "E8030000 08000000
             00000000 00000000 00000000 28000000 00000000 00000000 00000000 00000000
             02000000 30000000 44000000 01000000 00000000 00000000 00000000",
        );
        let mut reader = TaeReader::new(&data, false);
        let result = Animation::read(&mut reader, FormatProfile::new(TaeFormat::Ds3, false));
        assert!(matches!(
            result,
            Err(TaeError::UnsupportedVariant { value: 2, .. })
        ));
    }

    #[test]
    fn read_nonzero_body_padding() {
        let data = hex_bytes(
            "E8030000 08000000
             00000000 00000000 00000000 28000000 00000000 00000000 00000000 01000000",
        );
        let mut reader = TaeReader::new(&data, false);
        let result = Animation::read(&mut reader, FormatProfile::new(TaeFormat::Ds3, false));
        assert!(matches!(
            result,
            Err(TaeError::MalformedInput {
                offset: 0x24,
                expected: 0,
                actual: 1
            })
        ));
        // The body redirection is undone after the error.
        assert_eq!(8, reader.position());
    }

    #[test]
    fn write_ds1_32bit() {
        let profile = FormatProfile::new(TaeFormat::Ds1, false);
        let animation = Animation {
            id: 7,
            events: vec![Event::new(0.0, 1.0, 3, vec![0xAA, 0xBB])],
            event_groups: vec![EventGroup {
                group_type: 16,
                group_data: Some(EventGroupData::GroupData16),
                indices: vec![0],
            }],
            mini_header: MiniHeader::Standard(StandardMiniHeader {
                is_loop_by_default: true,
                ..Default::default()
            }),
            file_name: "a".to_string(),
        };

        // Counts come before offsets, and nothing is padded.
        let expected = hex_bytes(
            "07000000 08000000
             01000000 48000000 01000000 5E000000 02000000 40000000 24000000
             00000000 2C000000 3C000000 01000000 00000000 00000000
             61000000
             00000000 0000803F
             40000000 44000000 54000000
             03000000 5C000000 AABB
             01000000 72000000 6A000000
             10000000 00000000
             48000000",
        );

        let bytes = write_bytes(&[animation.clone()], profile);
        assert_eq!(expected, bytes);
        assert_eq!(vec![animation], read_bytes(&bytes, 1, profile));
    }

    #[test]
    fn write_ds1_32bit_anim_file_trailing_zeros() {
        let profile = FormatProfile::new(TaeFormat::Ds1, false);
        let body = "00000000 00000000 00000000 00000000 00000000 00000000 24000000";

        // Standard only has a single zero after the inner fields.
        let standard = Animation::new(0, MiniHeader::default(), String::new());
        assert_eq!(
            hex_bytes(&format!(
                "00000000 08000000 {}
                 00000000 2C000000 3C000000 00000000 00000000 00000000",
                body
            )),
            write_bytes(&[standard], profile)
        );

        let import = Animation::new(
            0,
            MiniHeader::ImportOtherAnim(ImportOtherAnimMiniHeader::default()),
            String::new(),
        );
        assert_eq!(
            hex_bytes(&format!(
                "00000000 08000000 {}
                 01000000 2C000000 40000000 00000000 FFFFFFFF 00000000 00000000",
                body
            )),
            write_bytes(&[import], profile)
        );
    }

    #[test]
    fn write_ds3_64bit() {
        let profile = FormatProfile::new(TaeFormat::Ds3, true);
        let mut animation = Animation::new(
            2,
            MiniHeader::ImportOtherAnim(ImportOtherAnimMiniHeader {
                import_from_anim_id: 5,
                unknown: -1,
            }),
            "b".to_string(),
        );
        animation.events.push(Event::new(0.5, 0.5, 1, vec![0x11; 4]));

        // The mini header type is followed by a zero to fill the varint.
        let expected = hex_bytes(
            "02000000 00000000 10000000 00000000
             90000000 00000000 00000000 00000000 80000000 00000000 40000000 00000000
             01000000 00000000 01000000 00000000
             01000000 00000000 50000000 00000000 70000000 00000000 05000000 FFFFFFFF
             00000000 00000000 00000000 00000000
             62000000 00000000 00000000 00000000
             0000003F 00000000 00000000 00000000
             80000000 00000000 80000000 00000000 A8000000 00000000
             01000000 00000000 B8000000 00000000 11111111",
        );

        let bytes = write_bytes(&[animation.clone()], profile);
        assert_eq!(expected, bytes);
        assert_eq!(vec![animation], read_bytes(&bytes, 1, profile));
    }

    #[test]
    fn count_too_large_for_i32() {
        assert_eq!(3, count_to_i32(3, 0).unwrap());
        assert!(matches!(
            count_to_i32(i32::MAX as usize + 1, 0x10),
            Err(TaeError::InvalidLength {
                offset: 0x10,
                length: 0x8000_0000
            })
        ));
    }

    #[test]
    fn write_group_data_type_mismatch() {
        let profile = FormatProfile::new(TaeFormat::Ds1, false);
        let mut animation = Animation::new(0, MiniHeader::default(), String::new());
        animation.event_groups.push(EventGroup {
            group_type: 0,
            group_data: Some(EventGroupData::GroupData16),
            indices: Vec::new(),
        });

        let mut writer = TaeWriter::new(false);
        let result = animation.write(&mut writer, 0, profile);
        assert!(matches!(
            result,
            Err(TaeError::GroupDataTypeMismatch {
                group_type: 0,
                data_type: 16
            })
        ));
    }

    #[test]
    fn write_nan_time() {
        let mut animation = Animation::new(0, MiniHeader::default(), String::new());
        animation.events.push(Event::new(f32::NAN, 1.0, 0, Vec::new()));

        let mut writer = TaeWriter::new(false);
        let result = animation.write(&mut writer, 0, FormatProfile::new(TaeFormat::Ds3, false));
        assert!(matches!(result, Err(TaeError::UnsupportedTime { .. })));
    }

    #[test]
    fn write_dangling_group_index() {
        let mut animation = Animation::new(0, MiniHeader::default(), String::new());
        animation.events.push(Event::new(0.0, 1.0, 0, Vec::new()));
        animation.event_groups.push(EventGroup {
            group_type: 0,
            group_data: None,
            indices: vec![1],
        });

        let mut writer = TaeWriter::new(false);
        let result = animation.write(&mut writer, 0, FormatProfile::new(TaeFormat::Ds3, false));
        assert!(matches!(
            result,
            Err(TaeError::EventIndexOutOfRange {
                index: 1,
                event_count: 1
            })
        ));
    }

    #[test]
    fn read_animations_empty() {
        let mut reader = TaeReader::new(&[], false);
        assert!(read_animations(&mut reader, 0, FormatProfile::new(TaeFormat::Ds3, false))
            .unwrap()
            .is_empty());
    }
}
