//! Configuration structs for demux and mux sessions.

use serde::{Deserialize, Serialize};

/// Demuxer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// Capacity of the `BufReader` used by path-based opens.
    pub read_buffer_size: usize,
    /// Upper bound on a single track's packed index, in bytes. Larger
    /// declared indexes fail with `AllocationFailure`.
    pub max_index_bytes: u64,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 64 * 1024,
            max_index_bytes: 1 << 30,
        }
    }
}

/// Muxer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Capacity of the `BufWriter` used by path-based creates.
    pub write_buffer_size: usize,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            write_buffer_size: 256 * 1024,
        }
    }
}
