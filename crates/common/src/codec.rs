//! Codec kinds and per-kind parameter blocks.
//!
//! The codec id carried next to these is opaque: the surrounding media
//! pipeline decides what it means.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::types::Rational;

/// Largest numerator/denominator reported for a sample aspect ratio.
pub const MAX_ASPECT_TERM: u32 = 255;

/// Media kind of a track, stored as a `u32` on disk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    Video,
    Audio,
}

impl CodecKind {
    pub fn to_wire(self) -> u32 {
        match self {
            Self::Video => 0,
            Self::Audio => 1,
        }
    }

    pub fn from_wire(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Video),
            1 => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Video parameter block (revision 2: five `u32`s).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoParams {
    pub width: u32,
    pub height: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub pixel_format: u32,
}

impl VideoParams {
    /// Pixel aspect ratio implied by the display size.
    ///
    /// `None` when any dimension is zero, meaning no adjustment applies.
    pub fn sample_aspect_ratio(&self) -> Option<Rational> {
        if self.width == 0 || self.height == 0 || self.display_width == 0 || self.display_height == 0
        {
            return None;
        }
        Rational::reduce(
            self.height as u64 * self.display_width as u64,
            self.width as u64 * self.display_height as u64,
            MAX_ASPECT_TERM,
        )
    }
}

/// Audio parameter block (revision 2: three `u32`s).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioParams {
    pub sample_rate: u32,
    pub channels: u32,
    pub bits_per_sample: u32,
}

/// Codec parameters, tagged by codec kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecParams {
    Video(VideoParams),
    Audio(AudioParams),
}

impl CodecParams {
    pub fn kind(&self) -> CodecKind {
        match self {
            Self::Video(_) => CodecKind::Video,
            Self::Audio(_) => CodecKind::Audio,
        }
    }

    /// Size of the revision-2 fixed block for this kind.
    pub fn block_size(&self) -> u64 {
        block_size(self.kind())
    }

    /// Rebuild parameters from a revision-1 string dictionary.
    ///
    /// Missing or unparseable values fall back to 0.
    pub fn from_legacy(kind: CodecKind, dict: &BTreeMap<String, String>) -> Self {
        match kind {
            CodecKind::Video => Self::Video(VideoParams {
                width: legacy_u32(dict, "frame_width"),
                height: legacy_u32(dict, "frame_height"),
                display_width: legacy_u32(dict, "display_width"),
                display_height: legacy_u32(dict, "display_height"),
                pixel_format: legacy_u32(dict, "pixel_format"),
            }),
            CodecKind::Audio => Self::Audio(AudioParams {
                sample_rate: legacy_u32(dict, "sample_rate"),
                channels: legacy_u32(dict, "channels"),
                bits_per_sample: legacy_u32(dict, "bit_depth"),
            }),
        }
    }

    pub fn as_video(&self) -> Option<&VideoParams> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioParams> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }
}

/// Size of the revision-2 fixed parameter block for `kind`.
pub fn block_size(kind: CodecKind) -> u64 {
    match kind {
        CodecKind::Video => 5 * 4,
        CodecKind::Audio => 3 * 4,
    }
}

fn legacy_u32(dict: &BTreeMap<String, String>, key: &str) -> u32 {
    let Some(raw) = dict.get(key) else {
        return 0;
    };
    match parse_c_integer(raw).and_then(|v| u32::try_from(v).ok()) {
        Some(v) => v,
        None => {
            warn!(key, value = %raw, "Unusable legacy parameter value, using 0");
            0
        }
    }
}

/// Parse an integer the way C's `strtol(s, NULL, 0)` reads it: optional
/// whitespace and sign, then `0x` hex, leading-`0` octal, or decimal.
/// Trailing garbage after the digits is ignored.
pub fn parse_c_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (16, hex)
    } else if s.len() > 1 && s.starts_with('0') {
        (8, &s[1..])
    } else {
        (10, s)
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        // A lone "0" (or "0x" with no digits) still reads as zero
        return if s.starts_with('0') { Some(0) } else { None };
    }
    let value = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -value } else { value })
}

/// Static description of the container format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    pub long_name: &'static str,
    pub mime_type: &'static str,
    pub extensions: &'static [&'static str],
}

pub const MADJ_FORMAT: FormatInfo = FormatInfo {
    name: "madj",
    long_name: "MADJ",
    mime_type: "video/x-madj",
    extensions: &["mjv"],
};
