//! `madj-mux` — MADJ container muxer.
//!
//! Combines encoded video and audio frames from any number of tracks into
//! a single MADJ file.
//!
//! # Architecture
//!
//! - **Buffered** — every frame is held in memory until `finalize()`
//! - **Header first** — track headers and packed indexes precede all payload
//! - **Two-pass layout** — data offsets are fixed up once the header size is known
//! - **Opaque payloads** — codec ids and frame bytes are stored verbatim

pub mod accumulator;
pub mod finalize;
pub mod muxer;
pub mod track;

// Re-export primary API types
pub use muxer::MadjMuxer;
pub use track::TrackConfig;
