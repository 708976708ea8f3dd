//! Shortest-form encoder for the supported CBOR subset.
//!
//! Signature transcripts depend on this being byte-exact for a given
//! [`CborValue`]: integer lengths always use the smallest encoding that
//! fits, and [`CborValue::Map`] entries are emitted in the order they
//! appear in the vector, never re-sorted.

use crate::value::CborValue;

/// Encode `value` to its canonical byte representation.
pub fn encode(value: &CborValue) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &CborValue, out: &mut Vec<u8>) {
    match value {
        CborValue::Uint(v) => encode_head(0, *v, out),
        CborValue::NegInt(v) => {
            debug_assert!(*v < 0, "NegInt must hold a negative value");
            let argument = (-1 - *v) as u64;
            encode_head(1, argument, out);
        },
        CborValue::Bytes(bytes) => {
            encode_head(2, bytes.len() as u64, out);
            out.extend_from_slice(bytes);
        },
        CborValue::Text(text) => {
            let bytes = text.as_bytes();
            encode_head(3, bytes.len() as u64, out);
            out.extend_from_slice(bytes);
        },
        CborValue::Array(items) => {
            encode_head(4, items.len() as u64, out);
            for item in items {
                encode_into(item, out);
            }
        },
        CborValue::Map(entries) => {
            encode_head(5, entries.len() as u64, out);
            for (key, value) in entries {
                encode_into(&CborValue::Text(key.clone()), out);
                encode_into(value, out);
            }
        },
        CborValue::Bool(false) => out.push(simple_byte(20)),
        CborValue::Bool(true) => out.push(simple_byte(21)),
        CborValue::Null => out.push(simple_byte(22)),
        CborValue::Float(f) => {
            out.push(simple_byte(27));
            out.extend_from_slice(&f.to_be_bytes());
        },
    }
}

fn simple_byte(info: u8) -> u8 {
    (7 << 5) | info
}

/// Emit a major-type/argument head using the shortest encoding that fits.
fn encode_head(major: u8, argument: u64, out: &mut Vec<u8>) {
    let prefix = major << 5;
    match argument {
        0..=23 => out.push(prefix | argument as u8),
        24..=0xFF => {
            out.push(prefix | 24);
            out.push(argument as u8);
        },
        0x100..=0xFFFF => {
            out.push(prefix | 25);
            out.extend_from_slice(&(argument as u16).to_be_bytes());
        },
        0x1_0000..=0xFFFF_FFFF => {
            out.push(prefix | 26);
            out.extend_from_slice(&(argument as u32).to_be_bytes());
        },
        _ => {
            out.push(prefix | 27);
            out.extend_from_slice(&argument.to_be_bytes());
        },
    }
}
