//! Ed25519 verification over domain-separated CBOR transcripts.

use ed25519_dalek::{Signature, VerifyingKey};
use ethernity_cbor::{CborValue, encode};

use crate::constants::{AUTH_DOMAIN, SHARD_DOMAIN};
use crate::error::SignatureError;

/// Build the auth-frame signature transcript: `AUTH_DOMAIN ‖ CBOR({version, hash, pub})`.
pub fn auth_transcript(version: u64, doc_hash: &[u8; 32], sign_pub: &[u8; 32]) -> Vec<u8> {
    let body = CborValue::Map(vec![
        ("version".to_string(), CborValue::Uint(version)),
        ("hash".to_string(), CborValue::Bytes(doc_hash.to_vec())),
        ("pub".to_string(), CborValue::Bytes(sign_pub.to_vec())),
    ]);

    let mut transcript = AUTH_DOMAIN.to_vec();
    transcript.extend_from_slice(&encode(&body));
    transcript
}

/// Fields needed to build a shard-frame signature transcript.
pub struct ShardTranscriptFields<'a> {
    /// Shard payload schema version.
    pub version: u64,
    /// Shard key type (`SHARD_KEY_PASSPHRASE` or `SHARD_KEY_SIGNING_SEED`).
    pub key_type: u64,
    /// Shamir threshold.
    pub threshold: u64,
    /// Total share count.
    pub share_count: u64,
    /// This share's index.
    pub share_index: u64,
    /// Length of the original secret, before block padding.
    pub secret_len: u64,
    /// Raw share bytes.
    pub share: &'a [u8],
    /// Document hash this shard is bound to.
    pub doc_hash: &'a [u8; 32],
    /// Signing public key this shard is bound to.
    pub sign_pub: &'a [u8; 32],
}

/// Build the shard-frame signature transcript: `SHARD_DOMAIN ‖ CBOR({..})`.
///
/// Field order is load-bearing: the encoder preserves map insertion order,
/// and the order here must match `spec.md` §4.7 exactly or authentic
/// signatures will fail to verify.
pub fn shard_transcript(fields: &ShardTranscriptFields<'_>) -> Vec<u8> {
    let body = CborValue::Map(vec![
        ("version".to_string(), CborValue::Uint(fields.version)),
        ("type".to_string(), CborValue::Uint(fields.key_type)),
        ("threshold".to_string(), CborValue::Uint(fields.threshold)),
        ("share_count".to_string(), CborValue::Uint(fields.share_count)),
        ("share_index".to_string(), CborValue::Uint(fields.share_index)),
        ("length".to_string(), CborValue::Uint(fields.secret_len)),
        ("share".to_string(), CborValue::Bytes(fields.share.to_vec())),
        ("hash".to_string(), CborValue::Bytes(fields.doc_hash.to_vec())),
        ("pub".to_string(), CborValue::Bytes(fields.sign_pub.to_vec())),
    ]);

    let mut transcript = SHARD_DOMAIN.to_vec();
    transcript.extend_from_slice(&encode(&body));
    transcript
}

/// Verify an Ed25519 `signature` over `transcript` using `public_key`.
pub fn verify(public_key: &[u8; 32], transcript: &[u8], signature: &[u8; 64]) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| SignatureError::MalformedPublicKey)?;
    let signature = Signature::from_bytes(signature);

    verifying_key
        .verify_strict(transcript, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
