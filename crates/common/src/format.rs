//! File-level layout: signature, version and the top-level header.
//!
//! ```text
//! tag: u32 = "MADJ"
//! version: u32
//! track_count: u32
//! track headers + packed indexes, in track order
//! payload data, track by track
//! ```

use std::io::{Read, Write};

use crate::error::{FormatError, MadjResult};
use crate::wire::{read_u32be, write_u32be};

/// File signature, "MADJ" in ASCII.
pub const MADJ_TAG: u32 = 0x4D41_444A;

/// Highest file version this implementation reads.
pub const MAX_VERSION: u32 = Revision::FixedParams.version();

/// Bytes taken by tag + version + track count.
pub const FILE_HEADER_SIZE: u64 = 3 * 4;

/// On-disk layout of the codec parameter block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Revision {
    /// Version 1: count-prefixed string key/value pairs.
    Legacy,
    /// Version 2: fixed-size block keyed by codec kind.
    FixedParams,
}

impl Revision {
    /// The revision every writer emits.
    pub const CURRENT: Self = Self::FixedParams;

    pub const fn version(self) -> u32 {
        match self {
            Self::Legacy => 1,
            Self::FixedParams => 2,
        }
    }

    pub fn from_version(version: u32) -> Result<Self, FormatError> {
        match version {
            1 => Ok(Self::Legacy),
            2 => Ok(Self::FixedParams),
            found => Err(FormatError::UnsupportedVersion {
                found,
                max: MAX_VERSION,
            }),
        }
    }
}

/// Check the first four bytes of a file for the MADJ signature.
///
/// Shorter input is simply not a match.
pub fn is_madj_signature(bytes: &[u8]) -> bool {
    match bytes.get(..4) {
        Some(head) => head == &MADJ_TAG.to_be_bytes()[..],
        None => false,
    }
}

/// Parsed top-level header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub revision: Revision,
    pub track_count: u32,
}

impl FileHeader {
    /// Read tag, version and track count, rejecting foreign or future files.
    pub fn read<R: Read>(reader: &mut R) -> MadjResult<Self> {
        let tag = read_u32be(reader)?;
        if tag != MADJ_TAG {
            return Err(FormatError::BadSignature { found: tag }.into());
        }
        let revision = Revision::from_version(read_u32be(reader)?)?;
        let track_count = read_u32be(reader)?;
        Ok(Self {
            revision,
            track_count,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> MadjResult<()> {
        write_u32be(writer, MADJ_TAG)?;
        write_u32be(writer, self.revision.version())?;
        write_u32be(writer, self.track_count)?;
        Ok(())
    }
}
