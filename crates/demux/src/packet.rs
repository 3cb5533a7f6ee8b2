//! Packets and per-stream descriptions handed to the media pipeline.

use madj_common::{CodecKind, CodecParams, Rational, TimeCode, TrackHeader};
use std::collections::BTreeMap;

/// One frame read from the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Payload bytes, freshly allocated per read.
    pub data: Vec<u8>,
    /// Track the frame belongs to.
    pub stream_index: usize,
    /// Presentation timestamp in frame units (equal to the frame number).
    pub pts: u64,
    /// Decode timestamp; always equal to `pts`.
    pub dts: u64,
    /// Duration in time-base units (`num_subframes`).
    pub duration: u64,
    /// Absolute byte offset of the payload in the file.
    pub position: u64,
}

impl Packet {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Abstract description of one track, as exposed to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub index: usize,
    pub codec_kind: CodecKind,
    pub codec_id: u32,
    pub params: CodecParams,
    pub time_base: Rational,
    pub start_time: u64,
    /// `num_frames * num_subframes`, in time-base units.
    pub duration: u64,
    pub frame_count: u64,
    /// Derived from display vs. coded size; `None` for audio or when
    /// the display size is unknown.
    pub sample_aspect_ratio: Option<Rational>,
    /// Legacy revision key/value pairs.
    pub metadata: BTreeMap<String, String>,
}

impl StreamInfo {
    pub fn from_header(index: usize, header: &TrackHeader) -> Self {
        Self {
            index,
            codec_kind: header.codec_kind(),
            codec_id: header.codec_id,
            params: header.params,
            time_base: header.time_base,
            start_time: 0,
            duration: header.duration(),
            frame_count: header.num_frames,
            sample_aspect_ratio: header.params.as_video().and_then(|v| v.sample_aspect_ratio()),
            metadata: header.metadata.clone(),
        }
    }

    /// Duration in seconds.
    pub fn duration_time(&self) -> TimeCode {
        TimeCode::from_secs(self.duration as f64 * self.time_base.as_f64())
    }
}
