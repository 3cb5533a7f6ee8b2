//! `madj-demux` — MADJ container demuxer.
//!
//! Parses the header and per-track indexes, then serves packets from all
//! tracks interleaved by presentation time. Payloads are returned as-is.

pub mod demuxer;
pub mod header;
pub mod packet;
pub mod probe;
pub mod scheduler;
pub mod seek;
pub mod traits;

pub use demuxer::MadjDemuxer;
pub use packet::{Packet, StreamInfo};
pub use probe::{probe, probe_score, PROBE_SCORE_MAX};
pub use traits::Demuxer;
