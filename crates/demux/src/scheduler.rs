//! Interleave scheduler.
//!
//! Each call picks the track whose next frame has the earliest
//! presentation time and reads exactly that frame. Ties go to the lowest
//! track index. Tracks with independent rates therefore come out in
//! non-decreasing global time order.

use madj_common::{FormatError, MadjError, MadjResult, TimeCode, TrackDescriptor, TrackHeader};
use std::io::{Read, Seek, SeekFrom};
use tracing::trace;

use crate::packet::Packet;

/// Per-track playback position.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackCursor {
    /// Next frame to emit. Never exceeds `num_frames`.
    pub decode_cursor: u64,
    /// Seconds per time-base unit (`rate_num / rate_den`).
    pub seconds_per_frame: f64,
    pub num_frames: u64,
    pub num_subframes: u64,
}

impl TrackCursor {
    pub fn from_header(header: &TrackHeader) -> Self {
        Self {
            decode_cursor: 0,
            seconds_per_frame: header.time_base.as_f64(),
            num_frames: header.num_frames,
            num_subframes: header.num_subframes,
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.decode_cursor < self.num_frames
    }

    /// Presentation time of the frame at the cursor.
    pub fn presentation_time(&self) -> TimeCode {
        let units = self.decode_cursor.saturating_mul(self.num_subframes);
        TimeCode::from_secs(self.seconds_per_frame * units as f64)
    }
}

/// Index of the track to read next, or `None` once every track is exhausted.
pub fn select_next(cursors: &[TrackCursor]) -> Option<usize> {
    let mut best: Option<(usize, TimeCode)> = None;
    for (i, cursor) in cursors.iter().enumerate() {
        if !cursor.has_remaining() {
            continue;
        }
        let t = cursor.presentation_time();
        // strict comparison keeps the first (lowest index) of equal times
        let earlier = match best {
            Some((_, best_t)) => t < best_t,
            None => true,
        };
        if earlier {
            best = Some((i, t));
        }
    }
    best.map(|(i, _)| i)
}

/// Read the next interleaved packet, or `Ok(None)` at end of stream.
///
/// The cursor only advances once the payload has been read in full.
pub fn next_packet<R: Read + Seek>(
    reader: &mut R,
    tracks: &[TrackDescriptor],
    cursors: &mut [TrackCursor],
) -> MadjResult<Option<Packet>> {
    let Some(stream_index) = select_next(cursors) else {
        return Ok(None);
    };
    let track = &tracks[stream_index];
    let cursor = &mut cursors[stream_index];
    let frame = cursor.decode_cursor;

    let entry = track
        .entry(frame)
        .ok_or(MadjError::OutOfRange {
            index: stream_index,
            count: tracks.len(),
        })?;
    let position = track
        .header
        .data_base_offset
        .checked_add(entry.offset)
        .ok_or(FormatError::IndexOverflow {
            size: entry.size as u64,
            offset: entry.offset,
        })?;

    reader.seek(SeekFrom::Start(position))?;
    let size = entry.size as usize;
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| MadjError::AllocationFailure { bytes: size as u64 })?;
    data.resize(size, 0);
    reader.read_exact(&mut data)?;

    trace!(stream_index, frame, size, position, "Read packet");
    cursor.decode_cursor += 1;

    Ok(Some(Packet {
        data,
        stream_index,
        pts: frame,
        dts: frame,
        duration: cursor.num_subframes,
        position,
    }))
}
