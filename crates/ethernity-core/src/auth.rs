//! Auth-frame payload (`spec.md` §3, §4.7).

use ethernity_cbor::{CborValue, decode};

use crate::error::PayloadError;

/// A signed attestation binding a document hash to a signing public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPayload {
    /// Payload schema version.
    pub version: u64,
    /// BLAKE2b-256 of the reassembled ciphertext, as claimed by the signer.
    pub doc_hash: [u8; 32],
    /// Ed25519 public key that produced `signature`.
    pub sign_pub: [u8; 32],
    /// Ed25519 signature over the auth transcript.
    pub signature: [u8; 64],
}

/// Decode an `Auth` frame's payload bytes into an [`AuthPayload`].
pub fn decode_auth_payload(data: &[u8]) -> Result<AuthPayload, PayloadError> {
    let value = decode(data)?;

    let version = value.require_u64("version")?;
    let doc_hash = require_array_32(&value, "hash")?;
    let sign_pub = require_array_32(&value, "pub")?;
    let signature = require_array_64(&value, "signature")?;

    Ok(AuthPayload { version, doc_hash, sign_pub, signature })
}

pub(crate) fn require_array_32(value: &CborValue, field: &'static str) -> Result<[u8; 32], PayloadError> {
    let bytes = value.require_bytes(field, 32)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(out)
}

pub(crate) fn require_array_64(value: &CborValue, field: &'static str) -> Result<[u8; 64], PayloadError> {
    let bytes = value.require(field)?.as_bytes().ok_or(PayloadError::WrongLength {
        field,
        expected: 64,
        actual: 0,
    })?;
    if bytes.len() != 64 {
        return Err(PayloadError::WrongLength { field, expected: 64, actual: bytes.len() });
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Encode an [`AuthPayload`] back to CBOR bytes for a frame's `data` field.
/// Test-only: production code never constructs auth frames.
#[cfg(any(test, feature = "test-support"))]
pub fn encode_auth_payload(payload: &AuthPayload) -> Vec<u8> {
    let value = CborValue::Map(vec![
        ("version".to_string(), CborValue::Uint(payload.version)),
        ("hash".to_string(), CborValue::Bytes(payload.doc_hash.to_vec())),
        ("pub".to_string(), CborValue::Bytes(payload.sign_pub.to_vec())),
        ("signature".to_string(), CborValue::Bytes(payload.signature.to_vec())),
    ]);
    ethernity_cbor::encode(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AuthPayload {
        AuthPayload { version: 1, doc_hash: [0x11; 32], sign_pub: [0x22; 32], signature: [0x33; 64] }
    }

    #[test]
    fn round_trips() {
        let payload = sample();
        let bytes = encode_auth_payload(&payload);
        let decoded = decode_auth_payload(&bytes).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn missing_field_is_rejected() {
        let value = CborValue::Map(vec![("version".to_string(), CborValue::Uint(1))]);
        let bytes = ethernity_cbor::encode(&value);
        assert!(decode_auth_payload(&bytes).is_err());
    }

    #[test]
    fn wrong_length_hash_is_rejected() {
        let value = CborValue::Map(vec![
            ("version".to_string(), CborValue::Uint(1)),
            ("hash".to_string(), CborValue::Bytes(vec![0u8; 10])),
            ("pub".to_string(), CborValue::Bytes(vec![0u8; 32])),
            ("signature".to_string(), CborValue::Bytes(vec![0u8; 64])),
        ]);
        let bytes = ethernity_cbor::encode(&value);
        assert!(matches!(decode_auth_payload(&bytes), Err(PayloadError::WrongLength { .. })));
    }
}
