//! High-level MADJ muxer API.
//!
//! Usage:
//! ```ignore
//! let tracks = vec![
//!     TrackConfig::video(h264_id, Rational::new(1, 25), 1920, 1080, yuv420p),
//!     TrackConfig::audio(aac_id, Rational::new(1, 48000), 48000, 2, 16, 1024),
//! ];
//! let mut muxer = MadjMuxer::create(Path::new("out.mjv"), tracks, &MuxConfig::default())?;
//!
//! // Frames are buffered in memory, in push order per track
//! muxer.write_packet(0, &video_frame)?;
//! muxer.write_packet(1, &audio_frame)?;
//!
//! // Finalize computes the layout and writes the whole file
//! muxer.finalize()?;
//! ```

use madj_common::{FormatError, MadjResult, MuxConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::accumulator::Accumulator;
use crate::finalize::{plan_layout, write_file};
use crate::track::TrackConfig;

/// MADJ muxer that buffers every frame and writes the file on `finalize()`.
///
/// The sink must be positioned at the start of the file: offsets in the
/// header are absolute from where writing begins. Dropping the muxer
/// without finalizing discards all buffered frames and writes nothing.
pub struct MadjMuxer<W: Write> {
    writer: W,
    tracks: Vec<TrackConfig>,
    accumulator: Accumulator,
}

impl MadjMuxer<BufWriter<File>> {
    /// Create a muxer writing to the given file.
    pub fn create(path: &Path, tracks: Vec<TrackConfig>, config: &MuxConfig) -> MadjResult<Self> {
        let file = File::create(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to create output file {:?}: {}", path, e),
            )
        })?;
        Self::new(BufWriter::with_capacity(config.write_buffer_size, file), tracks)
    }
}

impl<W: Write> MadjMuxer<W> {
    /// Open a mux session for `tracks` over `writer`.
    ///
    /// Track time bases are validated here, before any packet is accepted.
    pub fn new(writer: W, tracks: Vec<TrackConfig>) -> MadjResult<Self> {
        for (track, config) in tracks.iter().enumerate() {
            if !config.time_base.is_valid_time_base() {
                return Err(FormatError::InvalidTimeBase {
                    track,
                    num: config.time_base.num,
                    den: config.time_base.den,
                }
                .into());
            }
            info!(
                track,
                kind = config.codec_kind().display_name(),
                codec_id = config.codec_id,
                time_base = %config.time_base,
                "Added track"
            );
        }

        let accumulator = Accumulator::new(tracks.len());
        Ok(Self {
            writer,
            tracks,
            accumulator,
        })
    }

    /// Buffer one encoded frame for `stream_index`.
    pub fn write_packet(&mut self, stream_index: usize, data: &[u8]) -> MadjResult<()> {
        self.accumulator.push_packet(stream_index, data)
    }

    pub fn tracks(&self) -> &[TrackConfig] {
        &self.tracks
    }

    /// Number of frames buffered for a track.
    pub fn track_frame_count(&self, stream_index: usize) -> Option<usize> {
        self.accumulator.track(stream_index).map(|t| t.frame_count())
    }

    /// Payload bytes currently held in memory.
    pub fn buffered_bytes(&self) -> u64 {
        self.accumulator.buffered_bytes()
    }

    /// Lay out and write the complete file, flush, and return the sink.
    ///
    /// On error the sink may hold a partially written, invalid file.
    pub fn finalize(mut self) -> MadjResult<W> {
        let buffers = self.accumulator.tracks();
        let plan = plan_layout(&self.tracks, buffers)?;
        write_file(&mut self.writer, &plan, buffers)?;
        self.writer.flush()?;

        info!(
            tracks = plan.tracks.len(),
            header_bytes = plan.header_size,
            file_bytes = plan.file_size(),
            "MADJ file finalized successfully"
        );
        Ok(self.writer)
    }
}
