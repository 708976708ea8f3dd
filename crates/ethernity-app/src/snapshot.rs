//! Immutable read model for the (out-of-scope) UI layer (`spec.md` §1, §7).

/// How a [`StatusLine`] should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Operation succeeded.
    Ok,
    /// Non-fatal: ignored input, a conflict that didn't block progress.
    Warn,
    /// Operation failed.
    Error,
    /// A long-running primitive is in flight.
    Progress,
    /// Nothing to report yet.
    Idle,
}

/// One structured status line (`spec.md` §7: "status lines are structured as
/// `{lines: [string], tone}`").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Human-readable message.
    pub text: String,
    /// Rendering hint.
    pub tone: Tone,
}

impl StatusLine {
    /// Build a status line with the given tone.
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self { text: text.into(), tone }
    }
}

/// The auth-frame verification outcome (`spec.md` §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// No auth frame has been ingested yet.
    Missing,
    /// An auth frame is stored but verification has not yet run for it.
    ///
    /// Transient: this core verifies synchronously on every eager update, so
    /// callers observing a [`Snapshot`] between ingestion calls never see
    /// this value in practice. Kept for parity with the spec's status
    /// taxonomy and for a future suspend-able verifier.
    Pending,
    /// An auth frame is stored but main frames aren't complete yet, so the
    /// document hash it attests to can't be recomputed for comparison.
    WaitingForMainFrames,
    /// Signature verified against the reassembled ciphertext's hash.
    Verified,
    /// Signature verification ran and failed.
    InvalidSignature,
    /// The stored auth payload failed schema validation.
    ///
    /// Unreachable in this implementation: malformed auth payloads are
    /// rejected by [`ethernity_core::frame_store::FrameStore::add_frame`]
    /// before they're ever stored. Kept for parity with the spec's status
    /// taxonomy.
    InvalidPayload,
    /// The auth frame's `doc_id` disagreed with the frame store's.
    DocIdMismatch,
    /// The auth payload's claimed document hash disagreed with the
    /// reassembled ciphertext's actual hash.
    DocHashMismatch,
    /// Two distinct auth signatures were received for this document.
    Conflict,
    /// The document hash was confirmed but the runtime had no Ed25519
    /// verifier available.
    ///
    /// Unreachable in this implementation: Ed25519 verification is always
    /// available (`ed25519-dalek`). Kept for parity with the spec's status
    /// taxonomy.
    DocHashMatchesSignatureNotVerified,
}

/// An immutable, cloneable read model of [`crate::Session`] state, for the
/// (out-of-scope) UI layer to render (`spec.md` §1: "treat the UI as a pure
/// presenter over an immutable state snapshot").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Document identity, once established.
    pub doc_id: Option<[u8; 16]>,
    /// Declared total main frame count, once established.
    pub total: Option<u32>,
    /// Number of distinct main frame indices stored.
    pub main_frame_count: usize,
    /// Whether every main frame index is present.
    pub main_complete: bool,
    /// Number of distinct shard indices stored.
    pub shard_count: usize,
    /// Shamir threshold, once the first shard is accepted.
    pub shard_threshold: Option<u32>,
    /// Current auth verification status.
    pub auth_status: AuthStatus,
    /// Whether a passphrase or recovered shard secret is set.
    pub passphrase_known: bool,
    /// Whether the ciphertext has been successfully decrypted.
    pub decrypted: bool,
    /// Number of files recovered from the decrypted envelope.
    pub extracted_file_count: usize,
}
