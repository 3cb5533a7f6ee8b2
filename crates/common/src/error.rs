//! Central error types for the MADJ engine (thiserror-based).

use thiserror::Error;

/// Structural problems with MADJ data.
///
/// Always fatal to the open/parse/finalize operation that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Bad signature: expected 0x4D41444A, found {found:#010X}")]
    BadSignature { found: u32 },

    #[error("Unsupported version {found} (supported: 1..={max})")]
    UnsupportedVersion { found: u32, max: u32 },

    #[error("Invalid time base {num}/{den} on track {track}")]
    InvalidTimeBase { track: usize, num: u32, den: u32 },

    #[error("Index entry overflow: size {size} or offset {offset} does not fit u24/u40")]
    IndexOverflow { size: u64, offset: u64 },

    #[error("String of {len} bytes exceeds the 65535 byte limit")]
    StringTooLong { len: usize },

    #[error("Length-prefixed string is not valid UTF-8")]
    InvalidString,

    #[error("Unknown codec kind {kind} on track {track}")]
    UnknownCodecKind { track: usize, kind: u32 },
}

/// Top-level error for every demux and mux operation.
#[derive(Error, Debug)]
pub enum MadjError {
    /// Short read/write or seek failure on the byte stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A packet was pushed for a track the session does not have.
    #[error("Unknown stream {index} (session has {count} tracks)")]
    UnknownStream { index: usize, count: usize },

    /// A seek targeted a track the session does not have.
    #[error("Stream index {index} out of range (session has {count} tracks)")]
    OutOfRange { index: usize, count: usize },

    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailure { bytes: u64 },
}

impl MadjError {
    /// True if the error came from a truncated byte stream.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

/// Convenience Result type for MADJ operations.
pub type MadjResult<T> = Result<T, MadjError>;
