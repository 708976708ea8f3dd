//! Strict base64 decoding accepting both standard and URL-safe alphabets.
//!
//! Printed frame text mixes `+/` and `-_` depending on which tool rendered
//! it, so the decoder normalizes both to the standard alphabet before
//! decoding. ASCII whitespace is stripped first (callers routinely split
//! base64 across printed lines). A length congruent to 1 mod 4 can never be
//! a valid base64 payload and is rejected outright, before any padding is
//! applied.

use crate::error::CodecError;

const STANDARD_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn reverse_lookup() -> [i8; 256] {
    let mut table = [-1i8; 256];
    for (value, &ch) in STANDARD_ALPHABET.iter().enumerate() {
        table[ch as usize] = value as i8;
    }
    table
}

/// Decode base64 (standard or URL-safe alphabet, strict length rules).
pub fn decode_base64(input: &str) -> Result<Vec<u8>, CodecError> {
    let table = reverse_lookup();

    let mut chars: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| match b {
            b'-' => b'+',
            b'_' => b'/',
            other => other,
        })
        .collect();

    if chars.is_empty() {
        return Ok(Vec::new());
    }

    if chars.len() % 4 == 1 {
        return Err(CodecError::InvalidLength(chars.len()));
    }

    for (offset, &byte) in chars.iter().enumerate() {
        let valid = byte == b'=' || table[byte as usize] >= 0;
        if !valid {
            return Err(CodecError::InvalidCharacter { byte, offset, alphabet: "base64" });
        }
    }

    while chars.len() % 4 != 0 {
        chars.push(b'=');
    }

    let mut out = Vec::with_capacity(chars.len() / 4 * 3);
    let chunk_count = chars.len() / 4;

    for (chunk_index, chunk) in chars.chunks(4).enumerate() {
        let is_last_chunk = chunk_index + 1 == chunk_count;

        let mut values = [0u8; 4];
        let mut pad_count = 0usize;

        for (i, &byte) in chunk.iter().enumerate() {
            if byte == b'=' {
                if !is_last_chunk {
                    return Err(CodecError::InvalidLength(chars.len()));
                }
                pad_count += 1;
            } else {
                if pad_count > 0 {
                    return Err(CodecError::InvalidLength(chars.len()));
                }
                values[i] = table[byte as usize] as u8;
            }
        }

        if pad_count > 2 {
            return Err(CodecError::InvalidLength(chars.len()));
        }

        out.push((values[0] << 2) | (values[1] >> 4));
        if pad_count < 2 {
            out.push((values[1] << 4) | (values[2] >> 2));
        }
        if pad_count < 1 {
            out.push((values[2] << 6) | values[3]);
        }
    }

    Ok(out)
}

/// Encode bytes as standard base64 (`+/`, `=` padding).
pub fn encode_base64(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len().div_ceil(3) * 4);

    for chunk in input.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();

        out.push(STANDARD_ALPHABET[(b0 >> 2) as usize] as char);
        out.push(
            STANDARD_ALPHABET[(((b0 << 4) | (b1.unwrap_or(0) >> 4)) & 0x3F) as usize] as char,
        );

        if let Some(b1) = b1 {
            out.push(
                STANDARD_ALPHABET[(((b1 << 2) | (b2.unwrap_or(0) >> 6)) & 0x3F) as usize] as char,
            );
        } else {
            out.push('=');
        }

        if let Some(b2) = b2 {
            out.push(STANDARD_ALPHABET[(b2 & 0x3F) as usize] as char);
        } else {
            out.push('=');
        }
    }

    out
}

/// Returns true if every non-whitespace character of `input` belongs to the
/// strict standard base64 alphabet (`A-Za-z0-9+/=`).
///
/// This is deliberately narrower than what [`decode_base64`] accepts: the
/// decoder tolerates the URL-safe `-`/`_` variants as a convenience once the
/// format has already been decided, but classification (see
/// [`crate::decode_frame_blocks`]) needs the two alphabets to be
/// distinguishable, and z-base-32 text conventionally uses `-` as a group
/// separator.
pub fn is_base64(input: &str) -> bool {
    let table = reverse_lookup();
    input.bytes().filter(|b| !b.is_ascii_whitespace()).all(|b| b == b'=' || table[b as usize] >= 0)
}
