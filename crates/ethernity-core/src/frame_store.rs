//! Frame accumulation and document-identity reconciliation (`spec.md` §3, §4.6, §9).

use std::collections::HashMap;

use crate::auth::AuthPayload;
use crate::constants::DOC_ID_LEN;
use crate::frame::Frame;
use crate::shard::ShardPayload;

/// Result of attempting to add one frame or payload to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Accepted as new state.
    Added,
    /// Identical redelivery of already-stored state.
    Duplicate,
    /// Same identity, disagreeing content; the earlier value is kept.
    Conflict,
    /// Belongs to a different document; silently dropped.
    Ignored,
}

/// A stored auth payload together with the `doc_id` its frame declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    /// `doc_id` carried by the frame that delivered this payload.
    pub doc_id: [u8; DOC_ID_LEN],
    /// The decoded auth payload.
    pub payload: AuthPayload,
}

/// Shard metadata frozen from the first accepted shard (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardMetadata {
    /// Reconstruction target: passphrase or signing seed.
    pub key_type: crate::shard::KeyType,
    /// Shares required to reconstruct the secret.
    pub threshold: u32,
    /// Total shares that were generated.
    pub share_count: u32,
    /// Length of the original secret.
    pub secret_len: u32,
    /// Document hash this shard set is bound to.
    pub doc_hash: [u8; 32],
    /// Signing public key this shard set is bound to.
    pub sign_pub: [u8; 32],
}

impl ShardMetadata {
    fn from_payload(payload: &ShardPayload) -> Self {
        Self {
            key_type: payload.key_type,
            threshold: payload.threshold,
            share_count: payload.share_count,
            secret_len: payload.secret_len,
            doc_hash: payload.doc_hash,
            sign_pub: payload.sign_pub,
        }
    }

    fn matches(&self, payload: &ShardPayload) -> bool {
        self.key_type == payload.key_type
            && self.threshold == payload.threshold
            && self.share_count == payload.share_count
            && self.secret_len == payload.secret_len
            && self.doc_hash == payload.doc_hash
            && self.sign_pub == payload.sign_pub
    }
}

/// Accumulates main, auth, and shard frames for a single document, enforcing
/// the identity and metadata invariants from `spec.md` §3 and §4.6.
#[derive(Debug, Default)]
pub struct FrameStore {
    doc_id: Option<[u8; DOC_ID_LEN]>,
    total: Option<u32>,
    main_frames: HashMap<u32, Frame>,
    main_conflicts: u32,
    auth: Option<AuthRecord>,
    auth_conflicts: u32,
    shard_frames: HashMap<u8, ShardPayload>,
    shard_metadata: Option<ShardMetadata>,
    shard_conflicts: u32,
    /// Bumped on every accepted main frame, so downstream reassembly/hash
    /// caches can detect staleness (`spec.md` §9).
    version: u64,
}

impl FrameStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The document identity established by the first accepted main frame.
    pub fn doc_id(&self) -> Option<[u8; DOC_ID_LEN]> {
        self.doc_id
    }

    /// The declared total frame count from the first accepted main frame.
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    /// Number of distinct main frame indices currently stored.
    pub fn main_frame_count(&self) -> usize {
        self.main_frames.len()
    }

    /// Monotonic counter bumped on every accepted main frame.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Cumulative count of main frames whose index collided with different data.
    pub fn main_conflicts(&self) -> u32 {
        self.main_conflicts
    }

    /// Cumulative count of distinct auth signatures beyond the first.
    pub fn auth_conflicts(&self) -> u32 {
        self.auth_conflicts
    }

    /// Cumulative count of shards rejected for metadata or content conflicts.
    pub fn shard_conflicts(&self) -> u32 {
        self.shard_conflicts
    }

    /// Whether every index `0..total` has a stored frame.
    pub fn is_main_complete(&self) -> bool {
        match self.total {
            Some(total) => {
                self.main_frames.len() == total as usize
                    && (0..total).all(|i| self.main_frames.contains_key(&i))
            }
            None => false,
        }
    }

    /// Concatenate stored main frames `0..total` in order. `None` unless
    /// every index is present.
    pub fn reassemble(&self) -> Option<Vec<u8>> {
        if !self.is_main_complete() {
            return None;
        }
        let total = self.total?;
        let mut out = Vec::new();
        for i in 0..total {
            out.extend_from_slice(&self.main_frames.get(&i)?.data);
        }
        Some(out)
    }

    /// The stored auth record, if any.
    pub fn auth(&self) -> Option<&AuthRecord> {
        self.auth.as_ref()
    }

    /// Frozen shard metadata from the first accepted shard, if any.
    pub fn shard_metadata(&self) -> Option<&ShardMetadata> {
        self.shard_metadata.as_ref()
    }

    /// Stored shards, keyed by `share_index`.
    pub fn shard_frames(&self) -> &HashMap<u8, ShardPayload> {
        &self.shard_frames
    }

    /// Add one decoded main frame.
    pub fn add_main(&mut self, frame: Frame) -> Outcome {
        match self.doc_id {
            Some(existing) if existing != frame.doc_id => return Outcome::Ignored,
            Some(_) => {}
            None => self.doc_id = Some(frame.doc_id),
        }

        match self.total {
            Some(existing) if existing != frame.total => {
                self.main_conflicts += 1;
                return Outcome::Conflict;
            }
            Some(_) => {}
            None => self.total = Some(frame.total),
        }

        match self.main_frames.get(&frame.index) {
            Some(existing) if existing.data == frame.data => Outcome::Duplicate,
            Some(_) => {
                self.main_conflicts += 1;
                Outcome::Conflict
            }
            None => {
                self.main_frames.insert(frame.index, frame);
                self.version += 1;
                Outcome::Added
            }
        }
    }

    /// Add one decoded auth payload, together with the `doc_id` its frame
    /// carried.
    pub fn add_auth(&mut self, doc_id: [u8; DOC_ID_LEN], payload: AuthPayload) -> Outcome {
        match &self.auth {
            None => {
                self.auth = Some(AuthRecord { doc_id, payload });
                Outcome::Added
            }
            Some(existing) if existing.doc_id == doc_id && existing.payload == payload => {
                Outcome::Duplicate
            }
            Some(_) => {
                self.auth_conflicts += 1;
                Outcome::Conflict
            }
        }
    }

    /// Add one decoded shard payload.
    pub fn add_shard(&mut self, payload: ShardPayload) -> Outcome {
        match &self.shard_metadata {
            None => self.shard_metadata = Some(ShardMetadata::from_payload(&payload)),
            Some(metadata) if !metadata.matches(&payload) => {
                self.shard_conflicts += 1;
                return Outcome::Conflict;
            }
            Some(_) => {}
        }

        match self.shard_frames.get(&(payload.share_index as u8)) {
            Some(existing) if *existing == payload => Outcome::Duplicate,
            Some(_) => {
                self.shard_conflicts += 1;
                Outcome::Conflict
            }
            None => {
                self.shard_frames.insert(payload.share_index as u8, payload);
                Outcome::Added
            }
        }
    }

    /// Remove a shard whose signature failed verification (`spec.md` §4.7:
    /// "on verified-false, the shard is removed from the store").
    pub fn remove_shard(&mut self, share_index: u8) {
        self.shard_frames.remove(&share_index);
    }

    /// Route one decoded frame to the main/auth/shard store by its
    /// `frame_type`, decoding the frame's CBOR payload for Auth/Key frames.
    ///
    /// `ingest_main`/`ingest_shards`/`ingest_auth` all funnel through this
    /// single entry point (`spec.md` §4.6): a frame's type is self-describing,
    /// so which ingestion method the caller used doesn't change how it's
    /// routed.
    pub fn add_frame(&mut self, frame: Frame) -> Result<Outcome, crate::error::PayloadError> {
        match frame.frame_type {
            crate::frame::FrameType::Main => Ok(self.add_main(frame)),
            crate::frame::FrameType::Auth => {
                let payload = crate::auth::decode_auth_payload(&frame.data)?;
                Ok(self.add_auth(frame.doc_id, payload))
            }
            crate::frame::FrameType::Key => {
                let payload = crate::shard::decode_shard_payload(&frame.data)?;
                Ok(self.add_shard(payload))
            }
        }
    }
}
