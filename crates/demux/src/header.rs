//! Header reader: file tag/version, then each track's header and index.

use madj_common::{
    DemuxConfig, FileHeader, FormatError, MadjError, MadjResult, PackedIndex, Revision,
    TrackDescriptor, TrackHeader,
};
use std::io::{ErrorKind, Read};
use tracing::debug;

/// Everything parsed from the front of a MADJ file.
#[derive(Clone, Debug)]
pub struct ParsedHeader {
    pub revision: Revision,
    pub tracks: Vec<TrackDescriptor>,
}

/// Parse the header from the reader's current position.
///
/// On failure every partially built track is dropped before returning.
pub fn read_header<R: Read>(reader: &mut R, config: &DemuxConfig) -> MadjResult<ParsedHeader> {
    let file = FileHeader::read(reader)?;
    debug!(
        version = file.revision.version(),
        tracks = file.track_count,
        "MADJ file header"
    );

    let mut tracks = Vec::new();
    for track in 0..file.track_count as usize {
        let header = TrackHeader::read(reader, track, file.revision)?;
        let index = read_index(reader, &header, config)?;
        if !header.time_base.is_valid_time_base() {
            return Err(FormatError::InvalidTimeBase {
                track,
                num: header.time_base.num,
                den: header.time_base.den,
            }
            .into());
        }

        debug!(
            track,
            kind = header.codec_kind().display_name(),
            codec_id = header.codec_id,
            frames = header.num_frames,
            subframes = header.num_subframes,
            data_base_offset = header.data_base_offset,
            time_base = %header.time_base,
            "Parsed track header"
        );
        tracks.push(TrackDescriptor::new(header, index));
    }

    Ok(ParsedHeader {
        revision: file.revision,
        tracks,
    })
}

/// Read exactly `num_frames * 8` index bytes.
fn read_index<R: Read>(
    reader: &mut R,
    header: &TrackHeader,
    config: &DemuxConfig,
) -> MadjResult<PackedIndex> {
    let len = header
        .index_size()
        .ok_or(MadjError::AllocationFailure { bytes: u64::MAX })?;
    if len > config.max_index_bytes {
        return Err(MadjError::AllocationFailure { bytes: len });
    }
    let expected = usize::try_from(len).map_err(|_| MadjError::AllocationFailure { bytes: len })?;

    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(expected)
        .map_err(|_| MadjError::AllocationFailure { bytes: len })?;
    reader.by_ref().take(len).read_to_end(&mut bytes)?;

    if bytes.len() < expected {
        return Err(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("index truncated: expected {} bytes, got {}", expected, bytes.len()),
        )
        .into());
    }
    Ok(PackedIndex::from_bytes(bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use madj_common::wire::{write_len_string, write_u32be, write_u64be};
    use madj_common::{
        AudioParams, CodecParams, IndexEntry, Rational, VideoParams, FILE_HEADER_SIZE,
    };
    use std::collections::BTreeMap;
    use std::io::Cursor;

    /// A synthetic track: parameters, time base, subframes and frame payloads.
    pub(crate) struct TestTrack {
        pub params: CodecParams,
        pub time_base: Rational,
        pub num_subframes: u64,
        pub frames: Vec<Vec<u8>>,
    }

    pub(crate) fn video_track(time_base: Rational, frames: Vec<Vec<u8>>) -> TestTrack {
        TestTrack {
            params: CodecParams::Video(VideoParams {
                width: 320,
                height: 240,
                display_width: 320,
                display_height: 240,
                pixel_format: 0,
            }),
            time_base,
            num_subframes: 1,
            frames,
        }
    }

    pub(crate) fn audio_track(
        time_base: Rational,
        num_subframes: u64,
        frames: Vec<Vec<u8>>,
    ) -> TestTrack {
        TestTrack {
            params: CodecParams::Audio(AudioParams {
                sample_rate: 8000,
                channels: 1,
                bits_per_sample: 8,
            }),
            time_base,
            num_subframes,
            frames,
        }
    }

    /// Build a complete revision-2 file in memory.
    pub(crate) fn build_file(tracks: &[TestTrack]) -> Vec<u8> {
        let mut headers = Vec::new();
        let mut data_offset = 0u64;
        for t in tracks {
            let mut index = PackedIndex::new();
            let mut rel = 0u64;
            for f in &t.frames {
                index.push(IndexEntry::new(f.len() as u32, rel)).unwrap();
                rel += f.len() as u64;
            }
            let header = TrackHeader {
                num_frames: t.frames.len() as u64,
                num_subframes: t.num_subframes,
                data_base_offset: data_offset,
                time_base: t.time_base,
                codec_id: 1,
                params: t.params,
                metadata: BTreeMap::new(),
            };
            data_offset += rel;
            headers.push(TrackDescriptor::new(header, index));
        }
        let header_size: u64 =
            FILE_HEADER_SIZE + headers.iter().map(|d| d.encoded_size()).sum::<u64>();
        for d in &mut headers {
            d.header.data_base_offset += header_size;
        }

        let mut buf = Vec::new();
        FileHeader {
            revision: Revision::CURRENT,
            track_count: tracks.len() as u32,
        }
        .write(&mut buf)
        .unwrap();
        for d in &headers {
            d.header.write(&mut buf).unwrap();
            buf.extend_from_slice(d.index.as_bytes());
        }
        for t in tracks {
            for f in &t.frames {
                buf.extend_from_slice(f);
            }
        }
        buf
    }

    #[test]
    fn test_read_two_tracks() {
        let file = build_file(&[
            video_track(Rational::new(1, 25), vec![vec![1; 10], vec![2; 20]]),
            audio_track(Rational::new(1, 8000), 160, vec![vec![3; 5]]),
        ]);
        let parsed = read_header(&mut Cursor::new(&file), &DemuxConfig::default()).unwrap();
        assert_eq!(parsed.revision, Revision::FixedParams);
        assert_eq!(parsed.tracks.len(), 2);

        let video = &parsed.tracks[0];
        assert_eq!(video.header.num_frames, 2);
        assert_eq!(video.index.len(), 2);
        assert_eq!(video.index.get(1), Some(IndexEntry::new(20, 10)));
        // header: 12 + (60 + 16) + (52 + 8) = 148
        assert_eq!(video.header.data_base_offset, 148);

        let audio = &parsed.tracks[1];
        assert_eq!(audio.header.num_subframes, 160);
        assert_eq!(audio.header.data_base_offset, 148 + 30);
        assert_eq!(file.len(), 148 + 35);
    }

    #[test]
    fn test_zero_frames_is_legal() {
        let file = build_file(&[video_track(Rational::new(1, 30), vec![])]);
        let parsed = read_header(&mut Cursor::new(file), &DemuxConfig::default()).unwrap();
        assert_eq!(parsed.tracks[0].index.len(), 0);
    }

    #[test]
    fn test_zero_tracks() {
        let file = build_file(&[]);
        let parsed = read_header(&mut Cursor::new(file), &DemuxConfig::default()).unwrap();
        assert!(parsed.tracks.is_empty());
    }

    #[test]
    fn test_truncated_index_is_io_error() {
        let mut file = build_file(&[video_track(
            Rational::new(1, 25),
            vec![vec![0; 4], vec![0; 4], vec![0; 4]],
        )]);
        // 12 + 60 header bytes, then 24 index bytes; cut inside the last entry
        file.truncate(12 + 60 + 20);
        let err = read_header(&mut Cursor::new(file), &DemuxConfig::default()).unwrap_err();
        assert!(err.is_unexpected_eof(), "unexpected error: {err}");
    }

    #[test]
    fn test_invalid_time_base() {
        let file = build_file(&[video_track(Rational::new(1, 0), vec![vec![0; 2]])]);
        let err = read_header(&mut Cursor::new(file), &DemuxConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            MadjError::Format(FormatError::InvalidTimeBase { track: 0, num: 1, den: 0 })
        ));
    }

    #[test]
    fn test_index_larger_than_limit() {
        let file = build_file(&[video_track(Rational::new(1, 25), vec![vec![0; 1]; 4])]);
        let config = DemuxConfig {
            max_index_bytes: 16,
            ..DemuxConfig::default()
        };
        let err = read_header(&mut Cursor::new(file), &config).unwrap_err();
        assert!(matches!(err, MadjError::AllocationFailure { bytes: 32 }));
    }

    #[test]
    fn test_absurd_frame_count() {
        let mut file = build_file(&[video_track(Rational::new(1, 25), vec![])]);
        // num_frames lives right after the 12-byte file header
        file[12..20].copy_from_slice(&u64::MAX.to_be_bytes());
        let err = read_header(&mut Cursor::new(file), &DemuxConfig::default()).unwrap_err();
        assert!(matches!(err, MadjError::AllocationFailure { .. }));
    }

    #[test]
    fn test_legacy_revision_file() {
        let mut buf = Vec::new();
        FileHeader {
            revision: Revision::Legacy,
            track_count: 1,
        }
        .write(&mut buf)
        .unwrap();
        write_u64be(&mut buf, 1).unwrap(); // num_frames
        write_u64be(&mut buf, 1).unwrap(); // num_subframes
        write_u64be(&mut buf, 0).unwrap(); // data_base_offset, patched below
        write_u32be(&mut buf, 1).unwrap();
        write_u32be(&mut buf, 30).unwrap();
        write_u32be(&mut buf, 0).unwrap(); // video
        write_u32be(&mut buf, 28).unwrap();
        write_u32be(&mut buf, 2).unwrap();
        write_len_string(&mut buf, "frame_width").unwrap();
        write_len_string(&mut buf, "176").unwrap();
        write_len_string(&mut buf, "frame_height").unwrap();
        write_len_string(&mut buf, "144").unwrap();
        let data_base = buf.len() as u64 + 8;
        buf.extend_from_slice(&madj_common::encode_index_entry(3, 0).unwrap());
        buf.extend_from_slice(&[7, 8, 9]);
        buf[28..36].copy_from_slice(&data_base.to_be_bytes());

        let parsed = read_header(&mut Cursor::new(buf), &DemuxConfig::default()).unwrap();
        assert_eq!(parsed.revision, Revision::Legacy);
        let track = &parsed.tracks[0];
        let video = track.header.params.as_video().unwrap();
        assert_eq!((video.width, video.height), (176, 144));
        assert_eq!(video.display_width, 0);
        assert_eq!(track.header.metadata.len(), 2);
        assert_eq!(track.absolute_offset(0), Some(data_base));
    }
}
