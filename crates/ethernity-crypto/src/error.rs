//! Error types for the cryptographic layer.

use thiserror::Error;

/// Failures reconstructing a secret from Shamir shares.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShamirError {
    /// Fewer distinct shares were supplied than the declared threshold.
    #[error("insufficient shares: need {threshold}, have {supplied}")]
    InsufficientShares {
        /// Declared threshold.
        threshold: u32,
        /// Number of distinct shares supplied.
        supplied: u32,
    },

    /// Two shares carry the same `share_index`.
    #[error("duplicate share index {0}")]
    DuplicateIndex(u8),

    /// A share index fell outside `1..=255`.
    #[error("share index {0} out of range (must be 1..=255)")]
    IndexOutOfRange(u16),

    /// A share's byte length was not a multiple of the 16-byte block size.
    #[error("share length {0} is not a multiple of the block size")]
    MisalignedShareLength(usize),
}

/// Failures decrypting an age v1 passphrase container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgeError {
    /// The first line was not the expected version string.
    #[error("not an age-encryption.org/v1 file")]
    BadVersionLine,

    /// The stanza line did not have the expected `-> scrypt <salt> <logN>` shape.
    #[error("malformed scrypt stanza")]
    MalformedStanza,

    /// `logN` exceeded the hard cap of 20.
    #[error("scrypt logN {0} exceeds the maximum of 20")]
    LogNTooLarge(u32),

    /// The base64 stanza body did not decode to exactly 32 bytes.
    #[error("scrypt stanza body must decode to 32 bytes, got {0}")]
    BadBodyLength(usize),

    /// The footer line was missing or malformed.
    #[error("malformed MAC footer line")]
    MalformedFooter,

    /// ChaCha20-Poly1305 failed to open the wrapped file key: wrong passphrase.
    #[error("invalid passphrase")]
    InvalidPassphrase,

    /// The header HMAC did not match.
    #[error("invalid header HMAC")]
    InvalidHeaderHmac,

    /// The STREAM nonce line was missing or the wrong length.
    #[error("malformed STREAM nonce")]
    MalformedStreamNonce,

    /// The container ended before a required line or section was read.
    #[error("truncated age container")]
    Truncated,

    /// A STREAM chunk failed AEAD authentication.
    #[error("STREAM chunk {0} failed authentication")]
    ChunkAuthenticationFailed(u64),

    /// A STREAM chunk (other than the sole chunk) was empty.
    #[error("STREAM chunk {0} is empty")]
    EmptyChunk(u64),

    /// The underlying codec (base64) rejected a line.
    #[error("malformed base64 in age container: {0}")]
    Codec(#[from] ethernity_codecs::CodecError),
}

/// Failures verifying an Ed25519 signature over a reconstructed transcript.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The public key bytes did not form a valid Ed25519 point.
    #[error("malformed Ed25519 public key")]
    MalformedPublicKey,

    /// The signature bytes were not a valid Ed25519 signature encoding.
    #[error("malformed Ed25519 signature")]
    MalformedSignature,

    /// Verification ran but the signature did not match the transcript.
    #[error("signature verification failed")]
    VerificationFailed,
}
