//! z-base-32 encoding (human-oriented base32, z-base-32 alphabet).
//!
//! Used for printed shard and frame text. Decoding strips `-` and ASCII
//! whitespace and is case-insensitive; encoding always emits lowercase.
//! There is no padding character — a partial trailing quintet that does not
//! complete a byte is discarded on decode.

use crate::error::CodecError;

/// The z-base-32 alphabet, index == 5-bit value.
pub const ZBASE32_ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

fn reverse_lookup() -> [i8; 256] {
    let mut table = [-1i8; 256];
    for (value, &ch) in ZBASE32_ALPHABET.iter().enumerate() {
        table[ch as usize] = value as i8;
        table[ch.to_ascii_uppercase() as usize] = value as i8;
    }
    table
}

/// Decode a z-base-32 string into bytes.
///
/// `-` and ASCII whitespace are stripped before decoding. Any other
/// character outside the alphabet is rejected. Trailing bits that do not
/// complete a full byte are silently discarded, matching the z-base-32
/// convention of omitting padding.
pub fn decode_zbase32(input: &str) -> Result<Vec<u8>, CodecError> {
    let table = reverse_lookup();

    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    let mut out = Vec::with_capacity(input.len() * 5 / 8 + 1);

    for (offset, byte) in input.bytes().enumerate() {
        if byte == b'-' || byte.is_ascii_whitespace() {
            continue;
        }

        let value = table[byte as usize];
        if value < 0 {
            return Err(CodecError::InvalidCharacter { byte, offset, alphabet: "z-base-32" });
        }

        acc = (acc << 5) | u32::from(value as u8);
        acc_bits += 5;

        if acc_bits >= 8 {
            acc_bits -= 8;
            out.push(((acc >> acc_bits) & 0xFF) as u8);
        }
    }

    Ok(out)
}

/// Encode bytes as z-base-32 text (lowercase, no padding, no separators).
pub fn encode_zbase32(input: &[u8]) -> String {
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    let mut out = String::with_capacity(input.len() * 8 / 5 + 1);

    for &byte in input {
        acc = (acc << 8) | u32::from(byte);
        acc_bits += 8;

        while acc_bits >= 5 {
            acc_bits -= 5;
            let quintet = ((acc >> acc_bits) & 0x1F) as usize;
            out.push(ZBASE32_ALPHABET[quintet] as char);
        }
    }

    if acc_bits > 0 {
        let quintet = ((acc << (5 - acc_bits)) & 0x1F) as usize;
        out.push(ZBASE32_ALPHABET[quintet] as char);
    }

    out
}

/// Returns true if every character of `input` (ignoring `-` and ASCII
/// whitespace) belongs to the z-base-32 alphabet, case-insensitively.
pub fn is_zbase32(input: &str) -> bool {
    let table = reverse_lookup();
    input
        .bytes()
        .filter(|b| *b != b'-' && !b.is_ascii_whitespace())
        .all(|b| table[b as usize] >= 0)
}
