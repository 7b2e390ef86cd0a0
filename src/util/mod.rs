//! Shared utility modules used across Lucerne components.

pub mod bit_set;
pub mod varint;
