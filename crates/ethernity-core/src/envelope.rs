//! Envelope container and manifest (`spec.md` §3, §4.8, §6.3, §9 Open Question).

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use ethernity_cbor::CborValue;
use ethernity_codecs::read_uvarint;

use crate::constants::{ENVELOPE_MAGIC, ENVELOPE_VERSION, MANIFEST_VERSION};
use crate::error::EnvelopeError;

/// One entry of the manifest's `files` list, before extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// NFC-normalized, unique, non-empty path.
    pub path: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Required SHA-256 of the file's bytes.
    pub hash: [u8; 32],
    /// Modification time, if present.
    pub mtime: Option<i64>,
}

/// The decrypted envelope's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Manifest schema version.
    pub version: u64,
    /// Creation timestamp.
    pub created: u64,
    /// Whether this document was sealed (no recoverable signing seed).
    pub sealed: bool,
    /// Signing seed, present iff `!sealed`.
    pub seed: Option<[u8; 32]>,
    /// File entries in declared order.
    pub files: Vec<FileEntry>,
}

/// One recovered file, extracted from the envelope payload in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredFile {
    /// The file's NFC-normalized path.
    pub path: String,
    /// The file's bytes.
    pub data: Vec<u8>,
}

/// Decode and verify an envelope container, returning its manifest and the
/// files it describes, in declared order.
pub fn decode_envelope(bytes: &[u8]) -> Result<(Manifest, Vec<RecoveredFile>), EnvelopeError> {
    let mut pos = 0usize;

    let magic = bytes.get(0..2).ok_or(EnvelopeError::Truncated)?;
    if magic != ENVELOPE_MAGIC {
        return Err(EnvelopeError::BadMagic);
    }
    pos += 2;

    let (version, consumed) = read_uvarint(&bytes[pos..]).map_err(|_| EnvelopeError::Truncated)?;
    pos += consumed;
    if version != ENVELOPE_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(version));
    }

    let (manifest_len, consumed) = read_uvarint(&bytes[pos..]).map_err(|_| EnvelopeError::Truncated)?;
    pos += consumed;
    let manifest_len = usize::try_from(manifest_len).map_err(|_| EnvelopeError::Truncated)?;
    let manifest_bytes = bytes.get(pos..pos + manifest_len).ok_or(EnvelopeError::Truncated)?;
    pos += manifest_len;

    let (payload_len, consumed) = read_uvarint(&bytes[pos..]).map_err(|_| EnvelopeError::Truncated)?;
    pos += consumed;
    let payload_len = usize::try_from(payload_len).map_err(|_| EnvelopeError::Truncated)?;
    let payload = bytes.get(pos..pos + payload_len).ok_or(EnvelopeError::Truncated)?;
    pos += payload_len;

    if pos != bytes.len() {
        return Err(EnvelopeError::LengthMismatch { declared: pos, actual: bytes.len() });
    }

    let manifest = decode_manifest(manifest_bytes)?;
    let files = extract_files(&manifest, payload)?;

    Ok((manifest, files))
}

fn decode_manifest(bytes: &[u8]) -> Result<Manifest, EnvelopeError> {
    let value = ethernity_cbor::decode(bytes)?;

    if matches!(value, CborValue::Array(_)) {
        return Err(EnvelopeError::ArrayFormManifest);
    }

    let version = value.require_u64("version")?;
    if version != MANIFEST_VERSION {
        return Err(EnvelopeError::UnsupportedVersion(version));
    }

    let created = value.require_u64("created")?;
    let sealed = value.require("sealed")?.as_bool().ok_or(ethernity_cbor::CborError::WrongFieldType("sealed"))?;

    let seed_value = value.require("seed")?;
    let seed = match (sealed, seed_value) {
        (true, CborValue::Null) => None,
        (false, CborValue::Bytes(bytes)) => {
            if bytes.len() != 32 {
                return Err(EnvelopeError::BadSeedLength(bytes.len()));
            }
            let mut array = [0u8; 32];
            array.copy_from_slice(bytes);
            Some(array)
        }
        _ => return Err(EnvelopeError::SealedSeedMismatch),
    };

    let files_value = value.require("files")?.as_array().ok_or(ethernity_cbor::CborError::WrongFieldType("files"))?;

    let mut seen_paths = std::collections::HashSet::new();
    let mut files = Vec::with_capacity(files_value.len());
    for entry in files_value {
        let raw_path = entry.require_text("path")?;
        if raw_path.is_empty() {
            return Err(EnvelopeError::EmptyPath);
        }
        let path: String = raw_path.nfc().collect();
        if path.is_empty() {
            return Err(EnvelopeError::EmptyPath);
        }
        if !seen_paths.insert(path.clone()) {
            return Err(EnvelopeError::DuplicatePath(path));
        }

        let size = entry.require_u64("size")?;

        let hash_bytes = entry.require("hash")?.as_bytes().ok_or(ethernity_cbor::CborError::WrongFieldType("hash"))?;
        if hash_bytes.len() != 32 {
            return Err(EnvelopeError::BadHashLength { path: path.clone(), actual: hash_bytes.len() });
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(hash_bytes);

        let mtime = match entry.require("mtime")? {
            CborValue::Null => None,
            CborValue::Uint(v) => Some(*v as i64),
            CborValue::NegInt(v) => Some(*v as i64),
            _ => return Err(EnvelopeError::Cbor(ethernity_cbor::CborError::WrongFieldType("mtime"))),
        };

        files.push(FileEntry { path, size, hash, mtime });
    }

    Ok(Manifest { version, created, sealed, seed, files })
}

fn extract_files(manifest: &Manifest, payload: &[u8]) -> Result<Vec<RecoveredFile>, EnvelopeError> {
    let mut offset = 0usize;
    let mut out = Vec::with_capacity(manifest.files.len());

    for entry in &manifest.files {
        let size = usize::try_from(entry.size).map_err(|_| EnvelopeError::Truncated)?;
        let slice = payload.get(offset..offset + size).ok_or(EnvelopeError::Truncated)?;

        let digest: [u8; 32] = Sha256::digest(slice).into();
        if digest != entry.hash {
            return Err(EnvelopeError::HashMismatch(entry.path.clone()));
        }

        out.push(RecoveredFile { path: entry.path.clone(), data: slice.to_vec() });
        offset += size;
    }

    if offset != payload.len() {
        return Err(EnvelopeError::OffsetMismatch { consumed: offset, payload_len: payload.len() });
    }

    Ok(out)
}

/// Encode a manifest and file payload back into an envelope container.
/// Test-only: production code never constructs envelopes.
#[cfg(any(test, feature = "test-support"))]
pub fn encode_envelope(manifest: &Manifest, files: &[(&str, &[u8])]) -> Vec<u8> {
    let files_value = CborValue::Array(
        manifest
            .files
            .iter()
            .map(|entry| {
                CborValue::Map(vec![
                    ("path".to_string(), CborValue::Text(entry.path.clone())),
                    ("size".to_string(), CborValue::Uint(entry.size)),
                    ("hash".to_string(), CborValue::Bytes(entry.hash.to_vec())),
                    (
                        "mtime".to_string(),
                        match entry.mtime {
                            Some(v) if v >= 0 => CborValue::Uint(v as u64),
                            Some(v) => CborValue::NegInt(v as i128),
                            None => CborValue::Null,
                        },
                    ),
                ])
            })
            .collect(),
    );

    let manifest_value = CborValue::Map(vec![
        ("version".to_string(), CborValue::Uint(manifest.version)),
        ("created".to_string(), CborValue::Uint(manifest.created)),
        ("sealed".to_string(), CborValue::Bool(manifest.sealed)),
        (
            "seed".to_string(),
            match manifest.seed {
                Some(seed) => CborValue::Bytes(seed.to_vec()),
                None => CborValue::Null,
            },
        ),
        ("files".to_string(), files_value),
    ]);
    let manifest_bytes = ethernity_cbor::encode(&manifest_value);

    let payload: Vec<u8> = files.iter().flat_map(|(_, data)| data.iter().copied()).collect();

    let mut out = Vec::new();
    out.extend_from_slice(&ENVELOPE_MAGIC);
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(ENVELOPE_VERSION));
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(manifest_bytes.len() as u64));
    out.extend_from_slice(&manifest_bytes);
    out.extend_from_slice(&ethernity_codecs::encode_uvarint(payload.len() as u64));
    out.extend_from_slice(&payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest(files: Vec<FileEntry>) -> Manifest {
        Manifest { version: MANIFEST_VERSION, created: 1_700_000_000, sealed: true, seed: None, files }
    }

    fn file_entry(path: &str, data: &[u8]) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            size: data.len() as u64,
            hash: Sha256::digest(data).into(),
            mtime: Some(123),
        }
    }

    #[test]
    fn round_trips_with_files() {
        let entries = vec![file_entry("a.txt", b"hello"), file_entry("b.txt", b"world!")];
        let manifest = sample_manifest(entries);
        let files: Vec<(&str, &[u8])> = vec![("a.txt", b"hello"), ("b.txt", b"world!")];
        let bytes = encode_envelope(&manifest, &files);

        let (decoded_manifest, decoded_files) = decode_envelope(&bytes).unwrap();
        assert_eq!(decoded_manifest, manifest);
        assert_eq!(decoded_files.len(), 2);
        assert_eq!(decoded_files[0].path, "a.txt");
        assert_eq!(decoded_files[0].data, b"hello");
        assert_eq!(decoded_files[1].data, b"world!");
    }

    #[test]
    fn single_zero_byte_file_is_accepted() {
        let entries = vec![file_entry("empty.bin", b"")];
        let manifest = sample_manifest(entries);
        let files: Vec<(&str, &[u8])> = vec![("empty.bin", b"")];
        let bytes = encode_envelope(&manifest, &files);

        let (_, decoded_files) = decode_envelope(&bytes).unwrap();
        assert_eq!(decoded_files.len(), 1);
        assert_eq!(decoded_files[0].data, Vec::<u8>::new());
    }

    #[test]
    fn hash_mismatch_is_rejected() {
        let mut entries = vec![file_entry("a.txt", b"hello")];
        entries[0].hash[0] ^= 0xFF;
        let manifest = sample_manifest(entries);
        let files: Vec<(&str, &[u8])> = vec![("a.txt", b"hello")];
        let bytes = encode_envelope(&manifest, &files);

        assert!(matches!(decode_envelope(&bytes), Err(EnvelopeError::HashMismatch(_))));
    }

    #[test]
    fn duplicate_nfc_path_is_rejected() {
        // "é" as a single codepoint vs "e" + combining acute normalize to the
        // same NFC string.
        let combining = "e\u{0301}.txt";
        let precomposed = "\u{00e9}.txt";
        let entries = vec![file_entry(precomposed, b"one"), file_entry(combining, b"two")];
        let manifest = sample_manifest(entries);
        let files: Vec<(&str, &[u8])> = vec![(precomposed, b"one"), (combining, b"two")];
        let bytes = encode_envelope(&manifest, &files);

        assert!(matches!(decode_envelope(&bytes), Err(EnvelopeError::DuplicatePath(_))));
    }

    #[test]
    fn sealed_true_with_non_null_seed_is_rejected() {
        let manifest_value = CborValue::Map(vec![
            ("version".to_string(), CborValue::Uint(MANIFEST_VERSION)),
            ("created".to_string(), CborValue::Uint(1)),
            ("sealed".to_string(), CborValue::Bool(true)),
            ("seed".to_string(), CborValue::Bytes(vec![0u8; 32])),
            ("files".to_string(), CborValue::Array(vec![])),
        ]);
        let manifest_bytes = ethernity_cbor::encode(&manifest_value);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ENVELOPE_MAGIC);
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(ENVELOPE_VERSION));
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(manifest_bytes.len() as u64));
        bytes.extend_from_slice(&manifest_bytes);
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(0));

        assert!(matches!(decode_envelope(&bytes), Err(EnvelopeError::SealedSeedMismatch)));
    }

    #[test]
    fn array_form_manifest_is_rejected() {
        let manifest_value = CborValue::Array(vec![CborValue::Uint(1)]);
        let manifest_bytes = ethernity_cbor::encode(&manifest_value);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ENVELOPE_MAGIC);
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(ENVELOPE_VERSION));
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(manifest_bytes.len() as u64));
        bytes.extend_from_slice(&manifest_bytes);
        bytes.extend_from_slice(&ethernity_codecs::encode_uvarint(0));

        assert!(matches!(decode_envelope(&bytes), Err(EnvelopeError::ArrayFormManifest)));
    }

    #[test]
    fn offset_mismatch_is_rejected() {
        let entries = vec![file_entry("a.txt", b"hello")];
        let manifest = sample_manifest(entries);
        let files: Vec<(&str, &[u8])> = vec![("a.txt", b"hello")];
        let (decoded_manifest, _) = decode_envelope(&encode_envelope(&manifest, &files)).unwrap();

        let short_payload = b"hell"; // one byte short of the declared size
        assert!(matches!(
            extract_files(&decoded_manifest, short_payload),
            Err(EnvelopeError::Truncated)
        ));
    }
}
