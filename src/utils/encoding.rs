//! Text decoding for notes of unknown provenance.
//!
//! Notes are mostly UTF-8, but older ones can carry a BOM or a legacy
//! encoding (GBK, Shift-JIS, windows-1252). Everything is normalized to a
//! BOM-free UTF-8 `String`.

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::path::Path;

const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Decoded file content together with the encoding it was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub content: String,
    pub encoding: &'static str,
}

/// Read a file and decode it to UTF-8.
///
/// Strategy:
/// 1. A BOM decides the encoding and is stripped
/// 2. Strict UTF-8
/// 3. chardetng guess over the first 8 KiB, decoded with replacement
pub fn read_text_best_effort(path: &Path) -> Result<DecodedText> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_bytes(&bytes))
}

pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return DecodedText { content: decoded.into_owned(), encoding: encoding.name() };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText { content: text.to_string(), encoding: UTF_8.name() };
    }

    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    let encoding = detector.guess(None, true);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("decoding as {} replaced invalid sequences", encoding.name());
    }
    DecodedText { content: decoded.into_owned(), encoding: encoding.name() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_utf8_passthrough() {
        let decoded = decode_bytes("Test content 🚀".as_bytes());
        assert_eq!(decoded.content, "Test content 🚀");
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xef, 0xbb, 0xbf]).unwrap();
        file.write_all("# Hello".as_bytes()).unwrap();
        file.flush().unwrap();

        let decoded = read_text_best_effort(file.path()).unwrap();
        assert_eq!(decoded.content, "# Hello");
    }

    #[test]
    fn test_utf16_le_bom() {
        let mut bytes = vec![0xff, 0xfe];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_bytes(&bytes);
        assert_eq!(decoded.content, "hi");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn test_invalid_utf8_does_not_fail() {
        // Latin-1 "café" is not valid UTF-8.
        let decoded = decode_bytes(&[0x63, 0x61, 0x66, 0xe9]);
        assert!(decoded.content.starts_with("caf"));
        assert_ne!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_missing_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = read_text_best_effort(&tmp.path().join("nope.md")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
