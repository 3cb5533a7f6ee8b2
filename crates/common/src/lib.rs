//! `madj-common` — Shared types, wire primitives, and errors for the MADJ container.
//!
//! MADJ is a seekable container that multiplexes any number of video and
//! audio tracks into one file. Each track carries its own time base,
//! codec parameters and a packed frame index. Payloads are opaque.
//!
//! This crate is the foundation both `madj-demux` and `madj-mux` build on:
//!
//! - **Wire**: big-endian integers and length-prefixed strings
//! - **Index**: the packed 8-byte (u24 size | u40 offset) frame entries
//! - **Track**: per-track header blocks and the `TrackDescriptor`
//! - **Format**: signature, versions and the top-level header
//! - **Errors**: `MadjError`, `FormatError` (thiserror-based)
//! - **Config**: `DemuxConfig`, `MuxConfig`

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod index;
pub mod track;
pub mod types;
pub mod wire;

// Re-export commonly used items at crate root
pub use codec::{AudioParams, CodecKind, CodecParams, FormatInfo, VideoParams, MADJ_FORMAT};
pub use config::{DemuxConfig, MuxConfig};
pub use error::{FormatError, MadjError, MadjResult};
pub use format::{is_madj_signature, FileHeader, Revision, FILE_HEADER_SIZE, MADJ_TAG, MAX_VERSION};
pub use index::{decode_index_entry, encode_index_entry, IndexEntry, PackedIndex};
pub use track::{TrackDescriptor, TrackHeader};
pub use types::{Rational, TimeCode, GLOBAL_TIME_BASE};
