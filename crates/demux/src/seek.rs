//! Seek translation: timestamp -> frame index for every track.
//!
//! Seeking only recomputes cursors; no I/O happens here. Frames are
//! assumed independently addressable, so there is no keyframe snapping.

use madj_common::{MadjError, MadjResult, TimeCode};
use tracing::debug;

use crate::scheduler::TrackCursor;

/// Resolve a seek request to a time in seconds.
///
/// Without a target stream, `timestamp` is global time in
/// microseconds. With one, it is in that track's frame units, plus a
/// bias of a tenth of a frame toward the following frame.
pub fn target_time(
    cursors: &[TrackCursor],
    stream: Option<usize>,
    timestamp: i64,
) -> MadjResult<TimeCode> {
    match stream {
        None => Ok(TimeCode::from_global(timestamp)),
        Some(index) => {
            let cursor = cursors.get(index).ok_or(MadjError::OutOfRange {
                index,
                count: cursors.len(),
            })?;
            let spf = cursor.seconds_per_frame;
            Ok(TimeCode::from_secs(spf * timestamp as f64 + spf / 10.0))
        }
    }
}

/// Frame a track should resume from to present `time`.
///
/// Truncates toward zero; negative or non-finite results clamp to the
/// track's bounds.
pub fn frame_at(cursor: &TrackCursor, time: TimeCode) -> u64 {
    let units = (time.as_secs() / cursor.seconds_per_frame) as u64;
    let frame = units / cursor.num_subframes.max(1);
    frame.min(cursor.num_frames)
}

/// Reposition every track (not only the target) to `timestamp`.
pub fn seek(cursors: &mut [TrackCursor], stream: Option<usize>, timestamp: i64) -> MadjResult<()> {
    let time = target_time(cursors, stream, timestamp)?;
    for (track, cursor) in cursors.iter_mut().enumerate() {
        cursor.decode_cursor = frame_at(cursor, time);
        debug!(track, frame = cursor.decode_cursor, %time, "Seek");
    }
    Ok(())
}
