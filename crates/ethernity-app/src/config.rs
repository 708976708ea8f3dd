//! Resource guard rails for a session (`spec.md` §5 resource model).

use ethernity_crypto::constants::MAX_SCRYPT_LOG_N;

const DEFAULT_MAX_FRAME_PAYLOAD: usize = 16 * 1024 * 1024;
const DEFAULT_MAX_ENVELOPE_LEN: usize = 64 * 1024 * 1024;

/// Allocation and KDF-cost guard rails for a [`crate::Session`].
///
/// These are DoS guards, not protocol parameters: a caller who wants a
/// stricter budget can lower them, but `max_logn` can never be raised past
/// the spec's hard cap of 20.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum accepted age-scrypt `logN`. Never exceeds [`MAX_SCRYPT_LOG_N`].
    pub max_logn: u8,
    /// Maximum accepted single-frame `data` payload length, in bytes.
    pub max_frame_payload: usize,
    /// Maximum accepted decrypted envelope length, in bytes.
    pub max_envelope_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_logn: MAX_SCRYPT_LOG_N as u8,
            max_frame_payload: DEFAULT_MAX_FRAME_PAYLOAD,
            max_envelope_len: DEFAULT_MAX_ENVELOPE_LEN,
        }
    }
}

impl SessionConfig {
    /// A config with `max_logn` clamped to at most the spec's hard cap.
    pub fn new(max_logn: u8, max_frame_payload: usize, max_envelope_len: usize) -> Self {
        Self { max_logn: max_logn.min(MAX_SCRYPT_LOG_N as u8), max_frame_payload, max_envelope_len }
    }
}
