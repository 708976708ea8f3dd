//! Byte-level codecs for the recovery kit.
//!
//! Every frame and envelope the recovery core consumes ultimately starts out
//! as printed or scanned text. This crate turns that text into raw bytes:
//! z-base-32 and base64 decoding, LEB128 varints, CRC-32/IEEE, hex, and the
//! per-line autodetection that decides which alphabet a given chunk of text
//! uses.
//!
//! None of these functions know anything about frame or envelope structure —
//! that belongs to `ethernity-core`. This crate only turns text into bytes
//! and back.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod base64;
mod crc32;
mod detect;
mod error;
mod hex;
mod varint;
mod zbase32;

pub use base64::{decode_base64, encode_base64};
pub use crc32::crc32_ieee;
pub use detect::decode_frame_blocks;
pub use error::CodecError;
pub use hex::{decode_hex, encode_hex};
pub use varint::{encode_uvarint, read_uvarint};
pub use zbase32::{ZBASE32_ALPHABET, decode_zbase32, encode_zbase32};
