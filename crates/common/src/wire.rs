//! Big-endian wire primitives.
//!
//! Every multi-byte integer in a MADJ file is big-endian. Strings are
//! carried as a 2-byte length prefix followed by raw bytes, with no
//! terminator on the wire.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{FormatError, MadjError, MadjResult};

/// Longest string a 2-byte length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

pub fn read_u32be<R: Read>(reader: &mut R) -> MadjResult<u32> {
    Ok(reader.read_u32::<BigEndian>()?)
}

pub fn read_u64be<R: Read>(reader: &mut R) -> MadjResult<u64> {
    Ok(reader.read_u64::<BigEndian>()?)
}

pub fn write_u32be<W: Write>(writer: &mut W, value: u32) -> MadjResult<()> {
    writer.write_u32::<BigEndian>(value)?;
    Ok(())
}

pub fn write_u64be<W: Write>(writer: &mut W, value: u64) -> MadjResult<()> {
    writer.write_u64::<BigEndian>(value)?;
    Ok(())
}

/// Read a length-prefixed string.
///
/// A truncated body is an `Io` error; non UTF-8 content is
/// `FormatError::InvalidString`.
pub fn read_len_string<R: Read>(reader: &mut R) -> MadjResult<String> {
    let len = reader.read_u16::<BigEndian>()? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| MadjError::Format(FormatError::InvalidString))
}

/// Write a length-prefixed string. Fails before writing anything if the
/// string does not fit the 2-byte prefix.
pub fn write_len_string<W: Write>(writer: &mut W, s: &str) -> MadjResult<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_STRING_LEN {
        return Err(FormatError::StringTooLong { len: bytes.len() }.into());
    }
    writer.write_u16::<BigEndian>(bytes.len() as u16)?;
    writer.write_all(bytes)?;
    Ok(())
}

/// Encoded size of a length-prefixed string.
pub fn len_string_size(s: &str) -> u64 {
    2 + s.len() as u64
}
