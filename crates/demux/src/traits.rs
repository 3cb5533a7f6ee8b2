//! Demuxer trait definition.

use madj_common::MadjResult;

use crate::packet::{Packet, StreamInfo};

/// Trait for container demuxers.
pub trait Demuxer {
    /// One description per track, in track order.
    fn streams(&self) -> &[StreamInfo];

    /// Read the next packet in presentation order; `Ok(None)` at end of stream.
    fn next_packet(&mut self) -> MadjResult<Option<Packet>>;

    /// Reposition all tracks. `stream` selects whose time units
    /// `timestamp` is in; `None` means global microseconds.
    fn seek(&mut self, stream: Option<usize>, timestamp: i64) -> MadjResult<()>;

    /// Reset every track to its first frame.
    fn reset(&mut self);
}
