//! Errors surfaced by the session orchestrator's terminal operations.

use thiserror::Error;

/// Failures from `reassemble_ciphertext`, `combine_shards`, `decrypt`, or
/// `extract`. Ingestion (`ingest_main`/`ingest_shards`/`ingest_auth`) never
/// returns a `Result`; it accumulates an [`crate::Added`] record instead,
/// counting an oversized frame payload as just another rejected line
/// (`spec.md` §7).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested operation's preconditions were not met, e.g. not all
    /// main frames are present, or fewer than `threshold` shards.
    #[error("{0}")]
    NotReady(&'static str),

    /// A decrypted envelope exceeded `SessionConfig::max_envelope_len`.
    #[error("envelope of {actual} bytes exceeds the {limit}-byte limit")]
    EnvelopeTooLarge {
        /// Configured limit.
        limit: usize,
        /// Actual envelope length.
        actual: usize,
    },

    /// Envelope container or manifest failure.
    #[error(transparent)]
    Envelope(#[from] ethernity_core::EnvelopeError),

    /// Shamir reconstruction failure.
    #[error(transparent)]
    Shamir(#[from] ethernity_crypto::ShamirError),

    /// age-scrypt decryption failure.
    #[error(transparent)]
    Age(#[from] ethernity_crypto::AgeError),
}
