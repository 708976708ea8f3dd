//! Error type shared by all codecs in this crate.

use thiserror::Error;

/// Decode failures for the byte-level codecs.
///
/// These are always local, structural failures — the offending text is
/// rejected outright. Callers in `ethernity-core` turn these into `errors`
/// counter increments rather than propagating them as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A character outside the expected alphabet was encountered.
    #[error("invalid character {byte:#04x} at offset {offset} for {alphabet}")]
    InvalidCharacter {
        /// Offending byte.
        byte: u8,
        /// Byte offset within the input.
        offset: usize,
        /// Name of the alphabet that rejected it (`"base64"` or `"z-base-32"`).
        alphabet: &'static str,
    },

    /// Base64 input length is not congruent with a valid padded length.
    #[error("invalid base64 length: {0} chars")]
    InvalidLength(usize),

    /// A LEB128 varint did not terminate within the input, or would
    /// overflow the supported range (53 bits, matching JS-safe integers).
    #[error("truncated or oversized varint")]
    InvalidVarint,

    /// Hex input has an odd number of digits.
    #[error("odd-length hex string ({0} chars)")]
    OddHexLength(usize),

    /// Input text contains no decodable content (e.g. after stripping
    /// markers, whitespace-only sections remain).
    #[error("no decodable content in input")]
    Empty,

    /// Input could not be classified as either base64 or z-base-32.
    #[error("input is neither valid base64 nor z-base-32")]
    Unrecognized,
}
