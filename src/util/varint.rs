//! Variable-length integer encoding.
//!
//! Seven payload bits per byte, low bits first, with the high bit set on
//! every byte except the last. Used for posting deltas and for the doc IDs
//! in the [`MatchDoc`](crate::query::match_doc::MatchDoc) wire format.

use std::io::{Read, Write};

use byteorder::ReadBytesExt;

use crate::error::{LucerneError, Result};

/// Maximum number of bytes a u32 can occupy once encoded.
pub const MAX_U32_LEN: usize = 5;

/// Append the encoding of `value` to `out`.
pub fn encode_u32(value: u32, out: &mut Vec<u8>) {
    let mut val = value;
    while val >= 0x80 {
        out.push((val as u8 & 0x7F) | 0x80);
        val >>= 7;
    }
    out.push(val as u8);
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Decode a u32 starting at `*pos`, moving `*pos` past it.
///
/// Fails when the buffer ends mid-value or the value does not fit in 32 bits,
/// both of which mean the underlying data is corrupt.
pub fn decode_u32(bytes: &[u8], pos: &mut usize) -> Result<u32> {
    let mut result = 0u32;
    let mut shift = 0u32;

    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| LucerneError::index(format!("Truncated varint at byte {}", *pos)))?;
        *pos += 1;

        if shift == 28 && byte > 0x0F {
            return Err(LucerneError::index("Varint overflows u32"));
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

/// Write a variable-length encoded u32 to a writer.
pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<usize> {
    let mut buf = Vec::with_capacity(MAX_U32_LEN);
    encode_u32(value, &mut buf);
    writer.write_all(&buf)?;
    Ok(buf.len())
}

/// Read a variable-length encoded u32 from a reader.
pub fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut result = 0u32;
    let mut shift = 0u32;

    loop {
        let byte = reader.read_u8()?;

        if shift == 28 && byte > 0x0F {
            return Err(LucerneError::serialization("Varint overflows u32"));
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

/// Write a varint length followed by the UTF-8 bytes of `value`.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| LucerneError::serialization("String too long to encode"))?;
    write_u32(writer, len)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Read a string written by [`write_string`].
pub fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| LucerneError::serialization(format!("Invalid UTF-8: {e}")))
}
