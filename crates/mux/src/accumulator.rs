//! Per-track packet accumulation.
//!
//! Every pushed frame is copied and kept in memory until finalization,
//! together with its offset relative to the start of its track's data.
//! Frames are stored in push order; nothing is reordered.

use madj_common::{MadjError, MadjResult};

/// One buffered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Offset relative to the track's first payload byte.
    pub offset: u64,
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Append-only frame list for one track.
#[derive(Clone, Debug, Default)]
pub struct TrackBuffer {
    chunks: Vec<Chunk>,
    cumulative_offset: u64,
}

impl TrackBuffer {
    /// Copy `bytes` in as the next frame.
    pub fn push(&mut self, bytes: &[u8]) -> MadjResult<()> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())
            .map_err(|_| MadjError::AllocationFailure {
                bytes: bytes.len() as u64,
            })?;
        data.extend_from_slice(bytes);

        let offset = self.cumulative_offset;
        self.cumulative_offset += data.len() as u64;
        self.chunks.push(Chunk { offset, data });
        Ok(())
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn frame_count(&self) -> usize {
        self.chunks.len()
    }

    /// Payload bytes buffered so far (also the next frame's offset).
    pub fn total_bytes(&self) -> u64 {
        self.cumulative_offset
    }
}

/// Buffers for every track of a mux session, indexed by track number.
#[derive(Clone, Debug)]
pub struct Accumulator {
    tracks: Vec<TrackBuffer>,
}

impl Accumulator {
    pub fn new(track_count: usize) -> Self {
        Self {
            tracks: vec![TrackBuffer::default(); track_count],
        }
    }

    pub fn push_packet(&mut self, stream_index: usize, bytes: &[u8]) -> MadjResult<()> {
        let count = self.tracks.len();
        let track = self
            .tracks
            .get_mut(stream_index)
            .ok_or(MadjError::UnknownStream {
                index: stream_index,
                count,
            })?;
        track.push(bytes)
    }

    pub fn track(&self, stream_index: usize) -> Option<&TrackBuffer> {
        self.tracks.get(stream_index)
    }

    pub fn tracks(&self) -> &[TrackBuffer] {
        &self.tracks
    }

    /// Payload bytes held across all tracks.
    pub fn buffered_bytes(&self) -> u64 {
        self.tracks.iter().map(TrackBuffer::total_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate_per_track() {
        let mut acc = Accumulator::new(2);
        acc.push_packet(0, &[1; 10]).unwrap();
        acc.push_packet(1, &[2; 7]).unwrap();
        acc.push_packet(0, &[3; 4]).unwrap();
        acc.push_packet(0, &[]).unwrap();
        acc.push_packet(0, &[5; 1]).unwrap();

        let t0 = acc.track(0).unwrap();
        let offsets: Vec<u64> = t0.chunks().iter().map(|c| c.offset).collect();
        assert_eq!(offsets, vec![0, 10, 14, 14]);
        assert_eq!(t0.frame_count(), 4);
        assert_eq!(t0.total_bytes(), 15);

        let t1 = acc.track(1).unwrap();
        assert_eq!(t1.chunks()[0].offset, 0);
        assert_eq!(t1.chunks()[0].size(), 7);
        assert_eq!(acc.buffered_bytes(), 22);
    }

    #[test]
    fn bytes_are_copied() {
        let mut acc = Accumulator::new(1);
        let mut payload = vec![0xAA; 3];
        acc.push_packet(0, &payload).unwrap();
        payload[0] = 0x00;
        assert_eq!(acc.track(0).unwrap().chunks()[0].data, vec![0xAA; 3]);
    }

    #[test]
    fn unknown_stream() {
        let mut acc = Accumulator::new(1);
        let err = acc.push_packet(1, &[0]).unwrap_err();
        assert!(matches!(err, MadjError::UnknownStream { index: 1, count: 1 }));
        assert_eq!(acc.buffered_bytes(), 0);
        acc.push_packet(0, &[0]).unwrap();
    }
}
