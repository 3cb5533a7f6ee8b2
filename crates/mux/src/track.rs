//! Track configuration supplied when a mux session is opened.

use madj_common::{AudioParams, CodecKind, CodecParams, Rational, VideoParams};

/// Static description of one track to be muxed.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackConfig {
    /// Opaque codec tag, stored verbatim.
    pub codec_id: u32,
    pub params: CodecParams,
    /// Seconds per time-base unit.
    pub time_base: Rational,
    /// Time-base units per frame (e.g. audio samples per encoded frame).
    pub num_subframes: u64,
}

impl TrackConfig {
    /// Video track with square pixels: display size equals coded size.
    pub fn video(codec_id: u32, time_base: Rational, width: u32, height: u32, pixel_format: u32) -> Self {
        Self {
            codec_id,
            params: CodecParams::Video(VideoParams {
                width,
                height,
                display_width: width,
                display_height: height,
                pixel_format,
            }),
            time_base,
            num_subframes: 1,
        }
    }

    /// Audio track; one frame spans `frame_size * channels` time-base units.
    pub fn audio(
        codec_id: u32,
        time_base: Rational,
        sample_rate: u32,
        channels: u32,
        bits_per_sample: u32,
        frame_size: u32,
    ) -> Self {
        Self {
            codec_id,
            params: CodecParams::Audio(AudioParams {
                sample_rate,
                channels,
                bits_per_sample,
            }),
            time_base,
            num_subframes: frame_size as u64 * channels as u64,
        }
    }

    /// Derive the display size from a sample aspect ratio.
    ///
    /// Only the width is stretched, so the ratio reads back unchanged.
    /// A zero ratio clears the display size (no aspect information).
    /// Audio tracks are returned unchanged.
    pub fn with_sample_aspect_ratio(mut self, sar: Rational) -> Self {
        if let CodecParams::Video(v) = &mut self.params {
            v.display_width = rescale(v.width, sar);
            v.display_height = if v.display_width == 0 { 0 } else { v.height };
        }
        self
    }

    pub fn codec_kind(&self) -> CodecKind {
        self.params.kind()
    }
}

/// `value * num / den`, rounded to nearest (halves away from zero).
fn rescale(value: u32, ratio: Rational) -> u32 {
    if ratio.den == 0 {
        return 0;
    }
    let num = value as u64 * ratio.num as u64;
    let den = ratio.den as u64;
    u32::try_from((num + den / 2) / den).unwrap_or(u32::MAX)
}
