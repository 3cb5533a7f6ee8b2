//! Two-pass layout and the final linear write.
//!
//! The header (track headers + indexes) precedes the payload it points
//! into, yet its size depends on every track's frame count. So:
//!
//! 1. Per track: fix the frame count, give the track a data offset
//!    relative to the start of the payload section, add its header and
//!    index size to the running header size, and pack its index.
//! 2. Add the file header size, then shift every data offset by the
//!    total header size.
//!
//! Only then is the file written front to back.

use madj_common::track::{CODEC_INFO_SIZE, FRAME_INFO_SIZE};
use madj_common::{
    FileHeader, FormatError, IndexEntry, MadjResult, PackedIndex, Revision, TrackDescriptor,
    TrackHeader, FILE_HEADER_SIZE,
};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

use crate::accumulator::TrackBuffer;
use crate::track::TrackConfig;

/// Final header contents and sizes, ready to be written.
#[derive(Clone, Debug)]
pub struct LayoutPlan {
    /// Bytes before the first payload byte.
    pub header_size: u64,
    pub tracks: Vec<TrackDescriptor>,
}

impl LayoutPlan {
    /// Total file size once written.
    pub fn file_size(&self) -> u64 {
        self.header_size + self.tracks.iter().map(|t| t.payload_size()).sum::<u64>()
    }
}

/// Compute every track's index and absolute data offset.
///
/// Fails with `FormatError::IndexOverflow` if any frame's size or
/// relative offset does not fit the packed entry.
pub fn plan_layout(configs: &[TrackConfig], buffers: &[TrackBuffer]) -> MadjResult<LayoutPlan> {
    let mut header_size = 0u64;
    let mut data_offset = 0u64;
    let mut tracks = Vec::with_capacity(configs.len());

    // Pass 1: offsets relative to the payload section
    for (config, buffer) in configs.iter().zip(buffers) {
        let num_frames = buffer.frame_count() as u64;

        let mut index = PackedIndex::with_capacity(buffer.frame_count());
        for chunk in buffer.chunks() {
            let size = u32::try_from(chunk.size()).map_err(|_| FormatError::IndexOverflow {
                size: chunk.size(),
                offset: chunk.offset,
            })?;
            index.push(IndexEntry::new(size, chunk.offset))?;
        }

        let header = TrackHeader {
            num_frames,
            num_subframes: config.num_subframes,
            data_base_offset: data_offset,
            time_base: config.time_base,
            codec_id: config.codec_id,
            params: config.params,
            metadata: BTreeMap::new(),
        };

        header_size += FRAME_INFO_SIZE + CODEC_INFO_SIZE + config.params.block_size();
        header_size += index.as_bytes().len() as u64;
        data_offset += buffer.total_bytes();
        tracks.push(TrackDescriptor::new(header, index));
    }

    // Pass 2: payload starts after the whole header
    header_size += FILE_HEADER_SIZE;
    for track in &mut tracks {
        track.header.data_base_offset += header_size;
    }

    Ok(LayoutPlan {
        header_size,
        tracks,
    })
}

/// Write tag, version, track headers with indexes, then every track's
/// payload in index order.
///
/// An error leaves the sink partially written.
pub fn write_file<W: Write>(
    writer: &mut W,
    plan: &LayoutPlan,
    buffers: &[TrackBuffer],
) -> MadjResult<()> {
    FileHeader {
        revision: Revision::CURRENT,
        track_count: plan.tracks.len() as u32,
    }
    .write(writer)?;

    for track in &plan.tracks {
        track.header.write(writer)?;
        writer.write_all(track.index.as_bytes())?;
    }

    for (i, buffer) in buffers.iter().enumerate() {
        for chunk in buffer.chunks() {
            writer.write_all(&chunk.data)?;
        }
        debug!(
            track = i,
            frames = buffer.frame_count(),
            bytes = buffer.total_bytes(),
            "Wrote track payload"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use madj_common::{MadjError, Rational, MAX_VERSION};
    use std::io::Cursor;

    fn buffer(frames: &[&[u8]]) -> TrackBuffer {
        let mut b = TrackBuffer::default();
        for f in frames {
            b.push(f).unwrap();
        }
        b
    }

    #[test]
    fn test_single_track_header_size() {
        let configs = vec![TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0)];
        let buffers = vec![buffer(&[&[0; 100], &[0; 50], &[0; 25]])];
        let plan = plan_layout(&configs, &buffers).unwrap();

        // 12 file header + 32 frame info + 8 codec info + 20 video block + 3 * 8 index
        let expected = 12 + 32 + 8 + 20 + 3 * 8;
        assert_eq!(plan.header_size, expected);
        assert_eq!(plan.tracks[0].header.data_base_offset, expected);
        assert_eq!(plan.tracks[0].header.num_frames, 3);
        assert_eq!(plan.tracks[0].index.get(2), Some(IndexEntry::new(25, 150)));
        assert_eq!(plan.file_size(), expected + 175);
    }

    #[test]
    fn test_offsets_follow_previous_tracks() {
        let configs = vec![
            TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0),
            TrackConfig::audio(2, Rational::new(1, 8000), 8000, 1, 8, 160),
        ];
        let buffers = vec![buffer(&[&[0; 10], &[0; 10]]), buffer(&[&[0; 7]])];
        let plan = plan_layout(&configs, &buffers).unwrap();

        let header = 12 + (60 + 16) + (52 + 8);
        assert_eq!(plan.header_size, header);
        assert_eq!(plan.tracks[0].header.data_base_offset, header);
        assert_eq!(plan.tracks[1].header.data_base_offset, header + 20);
        assert_eq!(plan.tracks[1].header.num_subframes, 160);
    }

    #[test]
    fn test_empty_track() {
        let configs = vec![
            TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0),
            TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0),
        ];
        let buffers = vec![TrackBuffer::default(), buffer(&[&[1; 3]])];
        let plan = plan_layout(&configs, &buffers).unwrap();
        assert_eq!(plan.tracks[0].header.num_frames, 0);
        assert_eq!(
            plan.tracks[0].header.data_base_offset,
            plan.tracks[1].header.data_base_offset
        );
    }

    #[test]
    fn test_oversized_frame_overflows_index() {
        let configs = vec![TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0)];
        let big = vec![0u8; (1 << 24) as usize];
        let buffers = vec![buffer(&[&big])];
        let err = plan_layout(&configs, &buffers).unwrap_err();
        assert!(matches!(
            err,
            MadjError::Format(FormatError::IndexOverflow { size, offset: 0 }) if size == 1 << 24
        ));
    }

    #[test]
    fn test_write_layout() {
        let configs = vec![TrackConfig::audio(9, Rational::new(1, 100), 100, 1, 8, 1)];
        let buffers = vec![buffer(&[b"abc", b"de"])];
        let plan = plan_layout(&configs, &buffers).unwrap();

        let mut out = Cursor::new(Vec::new());
        write_file(&mut out, &plan, &buffers).unwrap();
        let bytes = out.into_inner();

        assert_eq!(bytes.len() as u64, plan.file_size());
        assert_eq!(&bytes[0..4], b"MADJ");
        assert_eq!(&bytes[4..8], &MAX_VERSION.to_be_bytes());
        assert_eq!(&bytes[8..12], &[0, 0, 0, 1]);
        // data_base_offset field sits after num_frames and num_subframes
        assert_eq!(&bytes[28..36], &plan.header_size.to_be_bytes());
        assert_eq!(&bytes[plan.header_size as usize..], b"abcde");
    }

    #[test]
    fn test_write_failure_propagates() {
        struct FailingSink;
        impl Write for FailingSink {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let configs = vec![TrackConfig::video(1, Rational::new(1, 25), 64, 48, 0)];
        let buffers = vec![buffer(&[&[0; 4]])];
        let plan = plan_layout(&configs, &buffers).unwrap();
        let err = write_file(&mut FailingSink, &plan, &buffers).unwrap_err();
        assert!(matches!(err, MadjError::Io(_)));
    }
}
