//! The session orchestrator: an eagerly-updating state machine over
//! ingested frames (`spec.md` §4.9, §6.5).

use zeroize::Zeroize;

use ethernity_core::frame_store::{FrameStore, Outcome};
use ethernity_core::{KeyType, Manifest, RecoveredFile};
use ethernity_crypto::shamir::Share;
use ethernity_crypto::signature::ShardTranscriptFields;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::snapshot::{AuthStatus, Snapshot};

/// Per-call ingestion counters. Never a `Result`: a batch of pasted frame
/// text is expected to contain a mix of good and bad lines, and the caller
/// wants to know how many fell into each bucket rather than abort on the
/// first one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Added {
    /// Frames accepted as new state.
    pub added: u32,
    /// Frames that were identical redeliveries of already-stored state.
    pub duplicates: u32,
    /// Frames that collided with stored state on identity but disagreed on content.
    pub conflicts: u32,
    /// Frames belonging to a different document, silently dropped.
    pub ignored: u32,
    /// Lines that failed to decode at any stage (codec, frame layout, payload schema).
    pub errors: u32,
}

/// Orchestrates frame ingestion, ciphertext reassembly, auth verification,
/// Shamir recovery, passphrase decryption, and envelope extraction for one
/// document.
pub struct Session {
    frame_store: FrameStore,
    config: SessionConfig,
    ciphertext: Option<Vec<u8>>,
    ciphertext_version: u64,
    cipher_doc_hash: Option<[u8; 32]>,
    auth_status: AuthStatus,
    recovered_shard_secret: Option<Vec<u8>>,
    passphrase: Option<Vec<u8>>,
    decrypted_envelope: Option<Vec<u8>>,
    manifest: Option<Manifest>,
    extracted_files: Vec<RecoveredFile>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(passphrase) = self.passphrase.as_mut() {
            passphrase.zeroize();
        }
        if let Some(secret) = self.recovered_shard_secret.as_mut() {
            secret.zeroize();
        }
    }
}

impl Session {
    /// A fresh session with [`SessionConfig::default`] guard rails.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// A fresh session with caller-supplied guard rails.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            frame_store: FrameStore::new(),
            config,
            ciphertext: None,
            ciphertext_version: 0,
            cipher_doc_hash: None,
            auth_status: AuthStatus::Missing,
            recovered_shard_secret: None,
            passphrase: None,
            decrypted_envelope: None,
            manifest: None,
            extracted_files: Vec::new(),
        }
    }

    /// Ingest one batch of printed main-frame text.
    pub fn ingest_main(&mut self, text: &str) -> Added {
        self.ingest("main", text)
    }

    /// Ingest one batch of printed shard-frame text.
    pub fn ingest_shards(&mut self, text: &str) -> Added {
        self.ingest("shards", text)
    }

    /// Ingest one batch of printed auth-frame text.
    ///
    /// A thin wrapper: auth frames flow through the same
    /// `decode_frame_blocks -> decode_frame -> FrameStore::add_frame`
    /// pipeline as any other frame type (`spec.md` §4.6).
    pub fn ingest_auth(&mut self, text: &str) -> Added {
        self.ingest("auth", text)
    }

    fn ingest(&mut self, kind: &'static str, text: &str) -> Added {
        let mut added = Added::default();

        for block in ethernity_codecs::decode_frame_blocks(text) {
            let bytes = match block {
                Ok(bytes) => bytes,
                Err(err) => {
                    added.errors += 1;
                    tracing::warn!(kind, %err, "frame block failed to decode");
                    continue;
                }
            };

            let frame = match ethernity_core::decode_frame(&bytes) {
                Ok(frame) => frame,
                Err(err) => {
                    added.errors += 1;
                    tracing::warn!(kind, %err, "frame layout invalid");
                    continue;
                }
            };

            if frame.data.len() > self.config.max_frame_payload {
                added.errors += 1;
                tracing::warn!(kind, limit = self.config.max_frame_payload, actual = frame.data.len(), "frame payload exceeds limit");
                continue;
            }

            match self.frame_store.add_frame(frame) {
                Ok(Outcome::Added) => added.added += 1,
                Ok(Outcome::Duplicate) => added.duplicates += 1,
                Ok(Outcome::Conflict) => added.conflicts += 1,
                Ok(Outcome::Ignored) => added.ignored += 1,
                Err(err) => {
                    added.errors += 1;
                    tracing::warn!(kind, %err, "frame payload failed schema validation");
                }
            }
        }

        tracing::debug!(
            kind,
            added = added.added,
            duplicates = added.duplicates,
            conflicts = added.conflicts,
            ignored = added.ignored,
            errors = added.errors,
            "frame batch ingested"
        );

        self.refresh_auth_status();
        added
    }

    /// Reassemble the ciphertext from stored main frames, caching the
    /// result until a new main frame invalidates it (`spec.md` §9).
    pub fn reassemble_ciphertext(&mut self) -> Result<&[u8], SessionError> {
        self.ensure_ciphertext_cached()?;
        Ok(self.ciphertext.as_deref().expect("just cached"))
    }

    fn ensure_ciphertext_cached(&mut self) -> Result<(), SessionError> {
        if self.ciphertext.is_some() && self.ciphertext_version == self.frame_store.version() {
            return Ok(());
        }
        let bytes = self
            .frame_store
            .reassemble()
            .ok_or(SessionError::NotReady("not all main frames are present"))?;
        self.cipher_doc_hash = Some(ethernity_crypto::digest::blake2b_256(&bytes));
        self.ciphertext_version = self.frame_store.version();
        self.ciphertext = Some(bytes);
        Ok(())
    }

    /// Verify every stored shard's signature, discard the ones that fail,
    /// and reconstruct the secret from the remaining quorum.
    ///
    /// A recovered passphrase becomes immediately usable by [`Self::decrypt`];
    /// a recovered signing seed is kept for inspection only, since knowing it
    /// cannot help decrypt the ciphertext.
    pub fn combine_shards(&mut self) -> Result<(), SessionError> {
        let metadata = *self
            .frame_store
            .shard_metadata()
            .ok_or(SessionError::NotReady("no shards ingested"))?;

        let mut shares = Vec::new();
        let mut invalid_indices = Vec::new();
        for payload in self.frame_store.shard_frames().values() {
            let fields = ShardTranscriptFields {
                version: payload.version,
                key_type: payload.key_type.to_u64(),
                threshold: u64::from(payload.threshold),
                share_count: u64::from(payload.share_count),
                share_index: u64::from(payload.share_index),
                secret_len: u64::from(payload.secret_len),
                share: &payload.share,
                doc_hash: &metadata.doc_hash,
                sign_pub: &metadata.sign_pub,
            };
            let transcript = ethernity_crypto::signature::shard_transcript(&fields);

            match ethernity_crypto::signature::verify(&metadata.sign_pub, &transcript, &payload.signature) {
                Ok(()) => shares.push(Share { index: payload.share_index as u8, bytes: payload.share.clone() }),
                Err(_) => {
                    invalid_indices.push(payload.share_index as u8);
                    tracing::warn!(share_index = payload.share_index, "shard signature invalid, discarding");
                }
            }
        }
        for index in invalid_indices {
            self.frame_store.remove_shard(index);
        }

        let secret = ethernity_crypto::shamir::combine(&shares, metadata.threshold, metadata.secret_len as usize)?;

        match metadata.key_type {
            KeyType::Passphrase => {
                if let Some(old) = self.passphrase.as_mut() {
                    old.zeroize();
                }
                self.passphrase = Some(secret);
            }
            KeyType::SigningSeed => {
                if let Some(old) = self.recovered_shard_secret.as_mut() {
                    old.zeroize();
                }
                self.recovered_shard_secret = Some(secret);
            }
        }

        tracing::info!(threshold = metadata.threshold, "shards combined");
        self.refresh_auth_status();
        Ok(())
    }

    /// Set a passphrase supplied directly by the holder, overriding any
    /// previously recovered or set passphrase.
    pub fn set_passphrase(&mut self, passphrase: &str) {
        if let Some(old) = self.passphrase.as_mut() {
            old.zeroize();
        }
        self.passphrase = Some(passphrase.as_bytes().to_vec());
    }

    /// Decrypt the reassembled ciphertext with the known passphrase.
    pub fn decrypt(&mut self) -> Result<&[u8], SessionError> {
        self.ensure_ciphertext_cached()?;
        let passphrase = self
            .passphrase
            .as_deref()
            .ok_or(SessionError::NotReady("no passphrase known"))?;
        let ciphertext = self.ciphertext.as_deref().expect("cached above");

        let plaintext = ethernity_crypto::age::decrypt(ciphertext, passphrase)?;
        if plaintext.len() > self.config.max_envelope_len {
            return Err(SessionError::EnvelopeTooLarge {
                limit: self.config.max_envelope_len,
                actual: plaintext.len(),
            });
        }

        if let Some(passphrase) = self.passphrase.as_mut() {
            passphrase.zeroize();
        }
        self.passphrase = None;
        self.decrypted_envelope = Some(plaintext);

        tracing::info!("ciphertext decrypted");
        Ok(self.decrypted_envelope.as_deref().expect("just set"))
    }

    /// Parse the decrypted envelope's manifest and recover its files.
    pub fn extract(&mut self) -> Result<&[RecoveredFile], SessionError> {
        let envelope = self
            .decrypted_envelope
            .as_deref()
            .ok_or(SessionError::NotReady("ciphertext not yet decrypted"))?;

        let (manifest, files) = ethernity_core::decode_envelope(envelope)?;
        tracing::info!(count = files.len(), "envelope extracted");
        self.manifest = Some(manifest);
        self.extracted_files = files;
        Ok(&self.extracted_files)
    }

    /// Discard all ingested and derived state, zeroizing secrets.
    pub fn reset(&mut self) {
        self.frame_store = FrameStore::new();
        self.ciphertext = None;
        self.ciphertext_version = 0;
        self.cipher_doc_hash = None;
        self.auth_status = AuthStatus::Missing;
        if let Some(secret) = self.recovered_shard_secret.as_mut() {
            secret.zeroize();
        }
        self.recovered_shard_secret = None;
        if let Some(passphrase) = self.passphrase.as_mut() {
            passphrase.zeroize();
        }
        self.passphrase = None;
        self.decrypted_envelope = None;
        self.manifest = None;
        self.extracted_files = Vec::new();
    }

    /// An immutable read model of the session's current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc_id: self.frame_store.doc_id(),
            total: self.frame_store.total(),
            main_frame_count: self.frame_store.main_frame_count(),
            main_complete: self.frame_store.is_main_complete(),
            shard_count: self.frame_store.shard_frames().len(),
            shard_threshold: self.frame_store.shard_metadata().map(|metadata| metadata.threshold),
            auth_status: self.auth_status,
            passphrase_known: self.passphrase.is_some(),
            decrypted: self.decrypted_envelope.is_some(),
            extracted_file_count: self.extracted_files.len(),
        }
    }

    fn refresh_auth_status(&mut self) {
        self.auth_status = self.compute_auth_status();
    }

    fn compute_auth_status(&mut self) -> AuthStatus {
        if self.frame_store.auth_conflicts() > 0 {
            return AuthStatus::Conflict;
        }

        let Some(record) = self.frame_store.auth().cloned() else {
            return AuthStatus::Missing;
        };

        match self.frame_store.doc_id() {
            None => return AuthStatus::WaitingForMainFrames,
            Some(doc_id) if doc_id != record.doc_id => return AuthStatus::DocIdMismatch,
            Some(_) => {}
        }

        if !self.frame_store.is_main_complete() || self.ensure_ciphertext_cached().is_err() {
            return AuthStatus::WaitingForMainFrames;
        }

        let actual_hash = self.cipher_doc_hash.expect("cached by ensure_ciphertext_cached");
        if actual_hash != record.payload.doc_hash {
            return AuthStatus::DocHashMismatch;
        }

        let transcript = ethernity_crypto::signature::auth_transcript(
            record.payload.version,
            &record.payload.doc_hash,
            &record.payload.sign_pub,
        );
        match ethernity_crypto::signature::verify(&record.payload.sign_pub, &transcript, &record.payload.signature) {
            Ok(()) => AuthStatus::Verified,
            Err(_) => AuthStatus::InvalidSignature,
        }
    }
}
