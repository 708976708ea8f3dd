//! Shard-frame payload (`spec.md` §3, §4.4, §4.7).

use ethernity_cbor::CborValue;
use ethernity_crypto::shamir::BLOCK_SIZE;

use crate::auth::{require_array_32, require_array_64};
use crate::constants::{SHARD_KEY_PASSPHRASE, SHARD_KEY_SIGNING_SEED};
use crate::error::PayloadError;

/// What kind of secret a shard reconstructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Reconstructs a passphrase.
    Passphrase,
    /// Reconstructs a signing seed.
    SigningSeed,
}

impl KeyType {
    fn from_u64(value: u64) -> Result<Self, PayloadError> {
        match value {
            v if v == SHARD_KEY_PASSPHRASE => Ok(Self::Passphrase),
            v if v == SHARD_KEY_SIGNING_SEED => Ok(Self::SigningSeed),
            other => Err(PayloadError::UnknownKeyType(other)),
        }
    }

    /// The wire representation used in shard payloads and signature transcripts.
    pub fn to_u64(self) -> u64 {
        match self {
            Self::Passphrase => SHARD_KEY_PASSPHRASE,
            Self::SigningSeed => SHARD_KEY_SIGNING_SEED,
        }
    }
}

/// One share of a Shamir-split secret, with its quorum metadata and signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPayload {
    /// Payload schema version.
    pub version: u64,
    /// What the reconstructed secret is used for.
    pub key_type: KeyType,
    /// Number of distinct shares required to reconstruct the secret.
    pub threshold: u32,
    /// Total number of shares that were generated.
    pub share_count: u32,
    /// This share's evaluation point, in `1..=255` and `<= share_count`.
    pub share_index: u32,
    /// Length of the original secret before block padding.
    pub secret_len: u32,
    /// This share's bytes, a multiple of [`BLOCK_SIZE`].
    pub share: Vec<u8>,
    /// Document hash this shard is bound to.
    pub doc_hash: [u8; 32],
    /// Signing public key this shard is bound to.
    pub sign_pub: [u8; 32],
    /// Ed25519 signature over the shard transcript.
    pub signature: [u8; 64],
}

/// Decode a `Key` frame's payload bytes into a [`ShardPayload`].
pub fn decode_shard_payload(data: &[u8]) -> Result<ShardPayload, PayloadError> {
    let value = ethernity_cbor::decode(data)?;

    let version = value.require_u64("version")?;
    let key_type = KeyType::from_u64(value.require_u64("type")?)?;
    let threshold = value.require_u64("threshold")?;
    let share_count = value.require_u64("share_count")?;
    let share_index = value.require_u64("share_index")?;
    let secret_len = value.require_u64("length")?;
    let share = value.require("share")?.as_bytes().ok_or(PayloadError::WrongLength {
        field: "share",
        expected: 0,
        actual: 0,
    })?;
    let doc_hash = require_array_32(&value, "hash")?;
    let sign_pub = require_array_32(&value, "pub")?;
    let signature = require_array_64(&value, "signature")?;

    if threshold == 0 {
        return Err(PayloadError::ZeroThreshold);
    }
    if share_count < threshold {
        return Err(PayloadError::ShareCountBelowThreshold {
            threshold: threshold as u32,
            share_count: share_count as u32,
        });
    }
    if share_index == 0 || share_index > 255 || share_index > share_count {
        return Err(PayloadError::ShareIndexOutOfRange(share_index));
    }
    if secret_len == 0 {
        return Err(PayloadError::ZeroSecretLen);
    }
    if share.len() % BLOCK_SIZE != 0 {
        return Err(PayloadError::MisalignedShare(share.len()));
    }

    Ok(ShardPayload {
        version,
        key_type,
        threshold: threshold as u32,
        share_count: share_count as u32,
        share_index: share_index as u32,
        secret_len: secret_len as u32,
        share: share.to_vec(),
        doc_hash,
        sign_pub,
        signature,
    })
}

/// Encode a [`ShardPayload`] back to CBOR bytes for a frame's `data` field.
/// Test-only: production code never constructs shard frames.
#[cfg(any(test, feature = "test-support"))]
pub fn encode_shard_payload(payload: &ShardPayload) -> Vec<u8> {
    let value = CborValue::Map(vec![
        ("version".to_string(), CborValue::Uint(payload.version)),
        ("type".to_string(), CborValue::Uint(payload.key_type.to_u64())),
        ("threshold".to_string(), CborValue::Uint(u64::from(payload.threshold))),
        ("share_count".to_string(), CborValue::Uint(u64::from(payload.share_count))),
        ("share_index".to_string(), CborValue::Uint(u64::from(payload.share_index))),
        ("length".to_string(), CborValue::Uint(u64::from(payload.secret_len))),
        ("share".to_string(), CborValue::Bytes(payload.share.clone())),
        ("hash".to_string(), CborValue::Bytes(payload.doc_hash.to_vec())),
        ("pub".to_string(), CborValue::Bytes(payload.sign_pub.to_vec())),
        ("signature".to_string(), CborValue::Bytes(payload.signature.to_vec())),
    ]);
    ethernity_cbor::encode(&value)
}
