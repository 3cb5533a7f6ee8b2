//! Packed frame index.
//!
//! Each frame of a track is described by one 8-byte entry:
//!
//! ```text
//!  byte 0   1   2 | 3   4   5   6   7
//!  size (u24, BE) | offset (u40, BE), relative to the track's data base
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Bytes per packed index entry.
pub const INDEX_ENTRY_SIZE: usize = 8;

/// Largest frame size an entry can carry (2^24 - 1).
pub const MAX_ENTRY_SIZE: u32 = (1 << 24) - 1;

/// Largest relative offset an entry can carry (2^40 - 1).
pub const MAX_ENTRY_OFFSET: u64 = (1 << 40) - 1;

/// One decoded index entry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Payload length in bytes.
    pub size: u32,
    /// Offset of the payload relative to the track's data base offset.
    pub offset: u64,
}

impl IndexEntry {
    pub fn new(size: u32, offset: u64) -> Self {
        Self { size, offset }
    }

    /// Relative offset of the first byte after this frame.
    pub fn end(&self) -> u64 {
        self.offset + self.size as u64
    }
}

/// Split a packed entry into `(size, offset)`.
pub fn decode_index_entry(bytes: [u8; INDEX_ENTRY_SIZE]) -> (u32, u64) {
    let size = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
    let offset = u64::from_be_bytes([0, 0, 0, bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]);
    (size, offset)
}

/// Pack `(size, offset)` into an entry.
///
/// Values that would be truncated on the wire are rejected.
pub fn encode_index_entry(size: u32, offset: u64) -> Result<[u8; INDEX_ENTRY_SIZE], FormatError> {
    if size > MAX_ENTRY_SIZE || offset > MAX_ENTRY_OFFSET {
        return Err(FormatError::IndexOverflow {
            size: size as u64,
            offset,
        });
    }
    let s = size.to_be_bytes();
    let o = offset.to_be_bytes();
    Ok([s[1], s[2], s[3], o[3], o[4], o[5], o[6], o[7]])
}

/// A track's index kept in its on-disk packed form.
///
/// Entries are decoded on access, so memory stays at 8 bytes per frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedIndex {
    bytes: Vec<u8>,
}

impl PackedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(frames: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(frames * INDEX_ENTRY_SIZE),
        }
    }

    /// Wrap raw index bytes read from a file.
    ///
    /// Trailing bytes that do not form a whole entry are dropped.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        let whole = bytes.len() / INDEX_ENTRY_SIZE * INDEX_ENTRY_SIZE;
        bytes.truncate(whole);
        Self { bytes }
    }

    /// Number of frames described.
    pub fn len(&self) -> usize {
        self.bytes.len() / INDEX_ENTRY_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the entry for `frame`, if present.
    pub fn get(&self, frame: usize) -> Option<IndexEntry> {
        let start = frame.checked_mul(INDEX_ENTRY_SIZE)?;
        let raw = self.bytes.get(start..start.checked_add(INDEX_ENTRY_SIZE)?)?;
        let mut packed = [0u8; INDEX_ENTRY_SIZE];
        packed.copy_from_slice(raw);
        let (size, offset) = decode_index_entry(packed);
        Some(IndexEntry { size, offset })
    }

    /// Append an entry, rejecting values outside the u24/u40 ranges.
    pub fn push(&mut self, entry: IndexEntry) -> Result<(), FormatError> {
        let packed = encode_index_entry(entry.size, entry.offset)?;
        self.bytes.extend_from_slice(&packed);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        self.bytes.chunks_exact(INDEX_ENTRY_SIZE).map(|raw| {
            let mut packed = [0u8; INDEX_ENTRY_SIZE];
            packed.copy_from_slice(raw);
            let (size, offset) = decode_index_entry(packed);
            IndexEntry { size, offset }
        })
    }

    /// Raw packed bytes, exactly `len() * 8` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
