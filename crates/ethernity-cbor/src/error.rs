//! Error type for the CBOR decoder.

use thiserror::Error;

/// Structural failures while decoding the supported CBOR subset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CborError {
    /// Input ended before an item could be fully parsed.
    #[error("unexpected end of input while decoding CBOR")]
    Truncated,

    /// An indefinite-length item or break code was encountered; this subset
    /// only supports definite lengths.
    #[error("indefinite-length CBOR items are not supported")]
    IndefiniteLength,

    /// A tagged item (major type 6) was encountered; tags are not supported.
    #[error("tagged CBOR items are not supported")]
    TaggedItemUnsupported,

    /// A major-type/additional-info combination this subset does not cover.
    #[error("unsupported CBOR item: major type {major}, additional info {info}")]
    UnsupportedItem {
        /// CBOR major type (0-7).
        major: u8,
        /// Additional info nibble.
        info: u8,
    },

    /// A text string's bytes were not valid UTF-8.
    #[error("text string is not valid UTF-8")]
    InvalidUtf8,

    /// A map key could not be coerced to a string (only text strings and
    /// integers are supported as keys).
    #[error("unsupported map key type")]
    UnsupportedKeyType,

    /// Extra bytes remained after decoding the top-level item.
    #[error("{0} trailing byte(s) after top-level CBOR item")]
    TrailingBytes(usize),

    /// A required field was missing from a decoded map.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field had the wrong CBOR type for its expected use.
    #[error("field '{0}' has the wrong type")]
    WrongFieldType(&'static str),
}
