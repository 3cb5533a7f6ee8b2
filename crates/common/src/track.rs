//! Per-track header and the Track Descriptor shared by both directions.
//!
//! On disk each track header is laid out as:
//!
//! ```text
//! frame info   num_frames u64 | num_subframes u64 | data_base_offset u64
//!              | rate_num u32 | rate_den u32
//! codec info   codec_kind u32 | codec_id u32 | parameter block
//! index        num_frames x 8 bytes
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Write};

use tracing::trace;

use crate::codec::{AudioParams, CodecKind, CodecParams, VideoParams};
use crate::error::{FormatError, MadjResult};
use crate::format::Revision;
use crate::index::{IndexEntry, PackedIndex, INDEX_ENTRY_SIZE};
use crate::types::Rational;
use crate::wire::{read_len_string, read_u32be, read_u64be, write_u32be, write_u64be};

/// Bytes taken by the frame-info block.
pub const FRAME_INFO_SIZE: u64 = 3 * 8 + 2 * 4;

/// Bytes taken by codec kind + codec id (before the parameter block).
pub const CODEC_INFO_SIZE: u64 = 2 * 4;

/// Static header fields of one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackHeader {
    pub num_frames: u64,
    /// Scaling factor for durations and presentation times (e.g. audio
    /// samples per frame). Never used to split payloads.
    pub num_subframes: u64,
    /// Absolute offset of the track's first payload byte.
    pub data_base_offset: u64,
    pub time_base: Rational,
    /// Opaque codec tag owned by the caller.
    pub codec_id: u32,
    pub params: CodecParams,
    /// Revision-1 key/value pairs, verbatim. Empty for revision 2.
    pub metadata: BTreeMap<String, String>,
}

impl TrackHeader {
    pub fn codec_kind(&self) -> CodecKind {
        self.params.kind()
    }

    /// Read one track header (without its index) in the given revision.
    pub fn read<R: Read>(reader: &mut R, track: usize, revision: Revision) -> MadjResult<Self> {
        let num_frames = read_u64be(reader)?;
        let num_subframes = read_u64be(reader)?;
        let data_base_offset = read_u64be(reader)?;
        let time_base = Rational::new(read_u32be(reader)?, read_u32be(reader)?);

        let raw_kind = read_u32be(reader)?;
        let kind = CodecKind::from_wire(raw_kind).ok_or(FormatError::UnknownCodecKind {
            track,
            kind: raw_kind,
        })?;
        let codec_id = read_u32be(reader)?;

        let (params, metadata) = match revision {
            Revision::Legacy => {
                let count = read_u32be(reader)?;
                let mut metadata = BTreeMap::new();
                for _ in 0..count {
                    let key = read_len_string(reader)?;
                    let value = read_len_string(reader)?;
                    trace!(track, %key, %value, "Legacy parameter");
                    metadata.insert(key, value);
                }
                (CodecParams::from_legacy(kind, &metadata), metadata)
            }
            Revision::FixedParams => (read_param_block(reader, kind)?, BTreeMap::new()),
        };

        Ok(Self {
            num_frames,
            num_subframes,
            data_base_offset,
            time_base,
            codec_id,
            params,
            metadata,
        })
    }

    /// Write the header in the current revision (fixed parameter block).
    pub fn write<W: Write>(&self, writer: &mut W) -> MadjResult<()> {
        write_u64be(writer, self.num_frames)?;
        write_u64be(writer, self.num_subframes)?;
        write_u64be(writer, self.data_base_offset)?;
        write_u32be(writer, self.time_base.num)?;
        write_u32be(writer, self.time_base.den)?;

        write_u32be(writer, self.codec_kind().to_wire())?;
        write_u32be(writer, self.codec_id)?;
        match &self.params {
            CodecParams::Video(v) => {
                write_u32be(writer, v.width)?;
                write_u32be(writer, v.height)?;
                write_u32be(writer, v.display_width)?;
                write_u32be(writer, v.display_height)?;
                write_u32be(writer, v.pixel_format)?;
            }
            CodecParams::Audio(a) => {
                write_u32be(writer, a.sample_rate)?;
                write_u32be(writer, a.channels)?;
                write_u32be(writer, a.bits_per_sample)?;
            }
        }
        Ok(())
    }

    /// Bytes [`TrackHeader::write`] emits, excluding the index.
    pub fn encoded_size(&self) -> u64 {
        FRAME_INFO_SIZE + CODEC_INFO_SIZE + self.params.block_size()
    }

    /// Duration in time-base units.
    pub fn duration(&self) -> u64 {
        self.num_frames.saturating_mul(self.num_subframes)
    }

    /// Bytes the packed index occupies on disk.
    pub fn index_size(&self) -> Option<u64> {
        self.num_frames.checked_mul(INDEX_ENTRY_SIZE as u64)
    }
}

fn read_param_block<R: Read>(reader: &mut R, kind: CodecKind) -> MadjResult<CodecParams> {
    Ok(match kind {
        CodecKind::Video => CodecParams::Video(VideoParams {
            width: read_u32be(reader)?,
            height: read_u32be(reader)?,
            display_width: read_u32be(reader)?,
            display_height: read_u32be(reader)?,
            pixel_format: read_u32be(reader)?,
        }),
        CodecKind::Audio => CodecParams::Audio(AudioParams {
            sample_rate: read_u32be(reader)?,
            channels: read_u32be(reader)?,
            bits_per_sample: read_u32be(reader)?,
        }),
    })
}

/// One track: its header plus its frame index.
///
/// Owned exclusively by a single demux or mux session and addressed by
/// track number.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackDescriptor {
    pub header: TrackHeader,
    pub index: PackedIndex,
}

impl TrackDescriptor {
    pub fn new(header: TrackHeader, index: PackedIndex) -> Self {
        Self { header, index }
    }

    pub fn entry(&self, frame: u64) -> Option<IndexEntry> {
        usize::try_from(frame).ok().and_then(|f| self.index.get(f))
    }

    /// Absolute file offset of `frame`'s payload.
    pub fn absolute_offset(&self, frame: u64) -> Option<u64> {
        let entry = self.entry(frame)?;
        self.header.data_base_offset.checked_add(entry.offset)
    }

    /// Total payload bytes described by the index.
    pub fn payload_size(&self) -> u64 {
        self.index.iter().map(|e| e.size as u64).sum()
    }

    /// Header plus index bytes as written by the current revision.
    pub fn encoded_size(&self) -> u64 {
        self.header.encoded_size() + self.index.as_bytes().len() as u64
    }
}
