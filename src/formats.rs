//! The records that make up a single animation entry.
//! Reading starts from [animation], which reads the other records as needed.

pub mod animation;
pub mod event;
pub mod event_group;
pub mod group_data;
pub mod mini_header;
