//! File probing — detect MADJ files by signature or extension.

use byteorder::{BigEndian, ReadBytesExt};
use madj_common::{is_madj_signature, MADJ_FORMAT, MADJ_TAG};
use std::io::Read;
use std::path::Path;

/// Score returned for a confident match.
pub const PROBE_SCORE_MAX: u32 = 100;

/// True only if the first four bytes are the MADJ signature.
pub fn probe(head: &[u8]) -> bool {
    is_madj_signature(head)
}

/// Probe score for the leading bytes of a file: `PROBE_SCORE_MAX` or 0.
pub fn probe_score(head: &[u8]) -> u32 {
    if probe(head) {
        PROBE_SCORE_MAX
    } else {
        0
    }
}

/// Read four bytes and check the signature.
///
/// A short or failing read is reported as "not MADJ", never as an error.
pub fn probe_reader<R: Read>(reader: &mut R) -> bool {
    matches!(reader.read_u32::<BigEndian>(), Ok(tag) if tag == MADJ_TAG)
}

/// Detect by file extension (`.mjv`).
pub fn has_madj_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| MADJ_FORMAT.extensions.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_probe_signature() {
        assert!(probe(b"MADJ\x00\x00\x00\x02"));
        assert_eq!(probe_score(b"MADJ"), PROBE_SCORE_MAX);
    }

    #[test]
    fn test_probe_rejects_other_formats() {
        assert!(!probe(&[0x1A, 0x45, 0xDF, 0xA3]));
        assert!(!probe(b"madj"));
        assert_eq!(probe_score(b"RIFF"), 0);
    }

    #[test]
    fn test_probe_truncated_input() {
        assert!(!probe(b"MA"));
        assert!(!probe(&[]));
        assert!(!probe_reader(&mut Cursor::new(vec![0x4D, 0x41, 0x44])));
    }

    #[test]
    fn test_probe_reader() {
        assert!(probe_reader(&mut Cursor::new(b"MADJ....".to_vec())));
        assert!(!probe_reader(&mut Cursor::new(b"ftypisom".to_vec())));
    }

    #[test]
    fn test_extension() {
        assert!(has_madj_extension(&PathBuf::from("clip.mjv")));
        assert!(has_madj_extension(&PathBuf::from("CLIP.MJV")));
        assert!(!has_madj_extension(&PathBuf::from("clip.mp4")));
        assert!(!has_madj_extension(&PathBuf::from("clip")));
    }
}
