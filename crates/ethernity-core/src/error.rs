//! Error types for frame decoding, payload schemas, and envelope parsing.

use ethernity_cbor::CborError;
use ethernity_codecs::CodecError;
use thiserror::Error;

/// Decode failures for the outer frame binary layout (`spec.md` §6.2).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The leading two magic bytes did not match [`crate::constants::FRAME_MAGIC`].
    #[error("bad frame magic")]
    BadMagic,

    /// The varint version field did not equal [`crate::constants::FRAME_VERSION`].
    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u64),

    /// The frame-type byte was not one of `{0: Main, 1: Auth, 2: Key}`.
    #[error("unknown frame type byte {0}")]
    UnknownFrameType(u8),

    /// Input ended before a required field could be read.
    #[error("truncated frame")]
    Truncated,

    /// The trailing CRC-32 did not match the recomputed value.
    #[error("frame CRC mismatch")]
    CrcMismatch,

    /// `index >= total`, or a non-main frame had `total != 1` / `index != 0`.
    #[error("invalid index/total: index={index}, total={total}")]
    InvalidIndexTotal {
        /// Declared index.
        index: u32,
        /// Declared total.
        total: u32,
    },

    /// Bytes remained after the trailing CRC.
    #[error("{0} trailing byte(s) after frame")]
    TrailingBytes(usize),

    /// A varint field was malformed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Schema failures in a decoded `Auth` or `Key` (shard) frame payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload body was not valid CBOR.
    #[error(transparent)]
    Cbor(#[from] CborError),

    /// A required field had the wrong byte length.
    #[error("field '{field}' must be {expected} bytes, got {actual}")]
    WrongLength {
        /// Field name.
        field: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// `key_type` was not a recognized enum value.
    #[error("unknown shard key type {0}")]
    UnknownKeyType(u64),

    /// `threshold` was zero.
    #[error("threshold must be positive")]
    ZeroThreshold,

    /// `share_count` was less than `threshold`.
    #[error("share_count {share_count} is less than threshold {threshold}")]
    ShareCountBelowThreshold {
        /// Declared threshold.
        threshold: u32,
        /// Declared share count.
        share_count: u32,
    },

    /// `share_index` fell outside `1..=255`, or above `share_count`.
    #[error("share_index {0} out of range")]
    ShareIndexOutOfRange(u64),

    /// `secret_len` was zero.
    #[error("secret_len must be positive")]
    ZeroSecretLen,

    /// `share` length was not a multiple of the Shamir block size.
    #[error("share length {0} is not a multiple of the block size")]
    MisalignedShare(usize),
}

/// Decode failures for the envelope container and manifest (`spec.md` §4.8, §6.3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The leading two magic bytes did not match [`crate::constants::ENVELOPE_MAGIC`].
    #[error("bad envelope magic")]
    BadMagic,

    /// The varint version field did not equal [`crate::constants::ENVELOPE_VERSION`].
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u64),

    /// Input ended before a required field or section could be read.
    #[error("truncated envelope")]
    Truncated,

    /// The declared lengths did not sum to the container's total length.
    #[error("envelope length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        /// Sum of the declared section lengths.
        declared: usize,
        /// Actual remaining bytes.
        actual: usize,
    },

    /// The manifest CBOR was structurally invalid.
    #[error(transparent)]
    Cbor(#[from] CborError),

    /// The manifest was a CBOR array rather than a map (`spec.md` §9 Open Question).
    #[error("array-form manifest is not supported; expected a map")]
    ArrayFormManifest,

    /// `sealed` and `seed` disagreed (`sealed=true` requires `seed=null` and
    /// vice versa).
    #[error("sealed/seed field mismatch")]
    SealedSeedMismatch,

    /// `seed` was present but not exactly 32 bytes.
    #[error("seed must be 32 bytes, got {0}")]
    BadSeedLength(usize),

    /// A file entry's `path` was empty.
    #[error("file entry has an empty path")]
    EmptyPath,

    /// Two file entries normalized (NFC) to the same path.
    #[error("duplicate file path after normalization: {0}")]
    DuplicatePath(String),

    /// A file entry's `hash` was not exactly 32 bytes.
    #[error("file '{path}' hash must be 32 bytes, got {actual}")]
    BadHashLength {
        /// File path.
        path: String,
        /// Actual hash length in bytes.
        actual: usize,
    },

    /// The declared file offsets did not advance strictly / exhaust the payload.
    #[error("file offsets do not account for the full payload: consumed {consumed}, payload_len {payload_len}")]
    OffsetMismatch {
        /// Bytes consumed while slicing files out of the payload.
        consumed: usize,
        /// Declared payload length.
        payload_len: usize,
    },

    /// A file's SHA-256 did not match its manifest entry.
    #[error("sha256 mismatch for {0}")]
    HashMismatch(String),
}
