//! Per-line alphabet autodetection and section-marker fallback.
//!
//! Printed recovery text comes in two shapes:
//!
//! - **One frame per line** — each non-empty line is independently
//!   classified as base64 or z-base-32 and decoded to one frame's raw bytes.
//! - **Marker-delimited sections** — when the text contains a line whose
//!   lower-cased form mentions `"main frame"`, `"auth frame"`,
//!   `"shard frame"`, or `"shard payload"`, the whole text is instead split
//!   into sections at those marker lines; every non-marker line in a
//!   section is concatenated (no separator) and decoded as *one* z-base-32
//!   frame.
//!
//! Both paths return one decode result per frame candidate; a failure in
//! one candidate never prevents the others from being decoded — callers
//! are expected to accumulate per-line error counters rather than abort.

use crate::{base64, error::CodecError, zbase32};

const SECTION_MARKERS: &[&str] = &["main frame", "auth frame", "shard frame", "shard payload"];

fn line_has_marker(line: &str) -> bool {
    let lower = line.to_lowercase();
    SECTION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Decode `text` into zero or more frame byte-blocks.
///
/// See the module docs for the two decoding modes. Each element of the
/// returned vector corresponds to exactly one candidate frame; blank lines
/// (and, in marker mode, the marker lines themselves) contribute nothing.
pub fn decode_frame_blocks(text: &str) -> Vec<Result<Vec<u8>, CodecError>> {
    if text.lines().any(line_has_marker) {
        decode_marked_sections(text)
    } else {
        decode_plain_lines(text)
    }
}

fn decode_plain_lines(text: &str) -> Vec<Result<Vec<u8>, CodecError>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_autodetect_line)
        .collect()
}

fn decode_autodetect_line(line: &str) -> Result<Vec<u8>, CodecError> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(CodecError::Empty);
    }

    if base64::is_base64(&compact) {
        base64::decode_base64(&compact)
    } else if zbase32::is_zbase32(&compact) {
        zbase32::decode_zbase32(&compact)
    } else {
        Err(CodecError::Unrecognized)
    }
}

fn decode_marked_sections(text: &str) -> Vec<Result<Vec<u8>, CodecError>> {
    let mut sections: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if line_has_marker(trimmed) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(String::new());
            continue;
        }

        if let Some(section) = current.as_mut() {
            section.push_str(trimmed);
        }
        // Lines before the first marker are preamble (titles, instructions)
        // and are dropped.
    }

    if let Some(section) = current.take() {
        sections.push(section);
    }

    sections
        .into_iter()
        .map(|section| {
            if section.is_empty() {
                Err(CodecError::Empty)
            } else {
                zbase32::decode_zbase32(&section)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_one_frame_per_line() {
        let a = base64::encode_base64(b"frame-a");
        let b = base64::encode_base64(b"frame-b");
        let text = format!("{a}\n{b}\n");

        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_ref().unwrap(), b"frame-a");
        assert_eq!(blocks[1].as_ref().unwrap(), b"frame-b");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let a = base64::encode_base64(b"x");
        let text = format!("\n\n{a}\n\n");
        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn dash_separated_line_falls_back_to_zbase32() {
        let payload = b"hello recovery kit";
        let encoded = zbase32::encode_zbase32(payload);
        // Insert a separator dash in the middle, which is not valid in the
        // strict base64 classification alphabet.
        let mid = encoded.len() / 2;
        let dashed = format!("{}-{}", &encoded[..mid], &encoded[mid..]);

        let blocks = decode_frame_blocks(&dashed);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_ref().unwrap(), payload);
    }

    #[test]
    fn marker_sections_join_without_separator() {
        let payload = b"reassembled ciphertext chunk";
        let encoded = zbase32::encode_zbase32(payload);
        let mid = encoded.len() / 2;

        let text = format!(
            "Main frame 1 of 2\n{}\nAuth frame\n{}\n",
            &encoded[..mid],
            &encoded[mid..]
        );

        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_ref().unwrap(), payload);
    }

    #[test]
    fn marker_case_insensitive() {
        let payload = b"x";
        let encoded = zbase32::encode_zbase32(payload);
        let text = format!("SHARD PAYLOAD\n{encoded}\n");
        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_ref().unwrap(), payload);
    }

    #[test]
    fn preamble_before_first_marker_is_dropped() {
        let payload = b"y";
        let encoded = zbase32::encode_zbase32(payload);
        let text = format!("Recovery Document\nInstructions...\nMain frame 1/1\n{encoded}\n");
        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_ref().unwrap(), payload);
    }

    #[test]
    fn unrecognized_line_reports_error_without_aborting_batch() {
        let good = base64::encode_base64(b"ok");
        let text = format!("{good}\n!!!not-valid!!!\n");
        let blocks = decode_frame_blocks(&text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_ok());
        assert!(blocks[1].is_err());
    }
}
