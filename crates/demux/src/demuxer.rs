//! MADJ demux session.
//!
//! Usage:
//! ```ignore
//! let mut demuxer = MadjDemuxer::open_path(Path::new("clip.mjv"), &DemuxConfig::default())?;
//! for stream in demuxer.streams() {
//!     println!("{}: {:?} codec {}", stream.index, stream.codec_kind, stream.codec_id);
//! }
//! while let Some(packet) = demuxer.next_packet()? {
//!     // hand packet.data to the decoder for packet.stream_index
//! }
//! ```

use madj_common::{DemuxConfig, MadjResult, Revision, TrackDescriptor};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

use crate::header::read_header;
use crate::packet::{Packet, StreamInfo};
use crate::scheduler::{self, TrackCursor};
use crate::seek;
use crate::traits::Demuxer;

/// An open MADJ file being read.
///
/// Owns the byte source and every track's header, index and cursor.
/// Dropping the session releases all of it.
pub struct MadjDemuxer<R> {
    reader: R,
    revision: Revision,
    tracks: Vec<TrackDescriptor>,
    cursors: Vec<TrackCursor>,
    streams: Vec<StreamInfo>,
}

impl MadjDemuxer<BufReader<File>> {
    /// Open a MADJ file from disk.
    pub fn open_path(path: &Path, config: &DemuxConfig) -> MadjResult<Self> {
        info!("Opening MADJ file: {}", path.display());
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(config.read_buffer_size, file);
        Self::open_with_config(reader, config)
    }
}

impl<R: Read + Seek> MadjDemuxer<R> {
    /// Parse the header from the reader's current position with default limits.
    pub fn open(reader: R) -> MadjResult<Self> {
        Self::open_with_config(reader, &DemuxConfig::default())
    }

    pub fn open_with_config(mut reader: R, config: &DemuxConfig) -> MadjResult<Self> {
        let parsed = read_header(&mut reader, config)?;

        let cursors = parsed
            .tracks
            .iter()
            .map(|t| TrackCursor::from_header(&t.header))
            .collect();
        let streams: Vec<StreamInfo> = parsed
            .tracks
            .iter()
            .enumerate()
            .map(|(i, t)| StreamInfo::from_header(i, &t.header))
            .collect();

        info!(
            version = parsed.revision.version(),
            tracks = streams.len(),
            "MADJ demuxer opened"
        );

        Ok(Self {
            reader,
            revision: parsed.revision,
            tracks: parsed.tracks,
            cursors,
            streams,
        })
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn tracks(&self) -> &[TrackDescriptor] {
        &self.tracks
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Next frame `stream` will emit, if the stream exists.
    pub fn position(&self, stream: usize) -> Option<u64> {
        self.cursors.get(stream).map(|c| c.decode_cursor)
    }

    /// Close the session, returning the byte source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Close the session and release every track.
    pub fn close(self) {
        debug!(tracks = self.tracks.len(), "MADJ demuxer closed");
    }
}

impl<R: Read + Seek> Demuxer for MadjDemuxer<R> {
    fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    fn next_packet(&mut self) -> MadjResult<Option<Packet>> {
        scheduler::next_packet(&mut self.reader, &self.tracks, &mut self.cursors)
    }

    fn seek(&mut self, stream: Option<usize>, timestamp: i64) -> MadjResult<()> {
        seek::seek(&mut self.cursors, stream, timestamp)
    }

    fn reset(&mut self) {
        for cursor in &mut self.cursors {
            cursor.decode_cursor = 0;
        }
    }
}
