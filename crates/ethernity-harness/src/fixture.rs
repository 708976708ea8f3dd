//! Deterministic fixture builders for end-to-end recovery scenarios.
//!
//! Frame, auth-payload, shard-payload, and age-container *encoding* are
//! write-side concerns the production crates deliberately don't implement
//! (`spec.md` §1). The scenario tests under `tests/` still need real bytes
//! to feed [`ethernity_app::Session`], so this crate builds them here on
//! top of the core crates' `test-support` encoders and a handful of crypto
//! primitives also used on the decrypt side.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use ed25519_dalek::{Signer, SigningKey};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use ethernity_core::constants::{FRAME_VERSION, MANIFEST_VERSION};
use ethernity_core::envelope::{FileEntry, Manifest, encode_envelope};
use ethernity_core::frame::{Frame, FrameType, encode_frame};
use ethernity_core::shard::{KeyType, ShardPayload, encode_shard_payload};
use ethernity_core::{AuthPayload, encode_auth_payload};
use ethernity_crypto::constants::{
    AGE_VERSION_LINE, BODY_LINE_MAX_CHARS, FILE_KEY_LEN, HKDF_INFO_HEADER, HKDF_INFO_PAYLOAD,
    SCRYPT_SALT_LEN, STREAM_CHUNK_PLAINTEXT_SIZE, STREAM_NONCE_LEN,
};
use ethernity_crypto::shamir::{Share, split};
use ethernity_crypto::signature::{ShardTranscriptFields, auth_transcript, shard_transcript};

const SCRYPT_LABEL: &[u8] = b"age-encryption.org/v1/scrypt";
const FOOTER_PREFIX: &str = "--- ";
const FIXED_CREATED: u64 = 1_700_000_000;

type HmacSha256 = Hmac<Sha256>;

/// A deterministic Ed25519 signing key, reproducible from `seed`.
pub fn signing_key(seed: u64) -> SigningKey {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    SigningKey::generate(&mut rng)
}

/// Printed text for one frame's raw bytes, in the base64-per-line form a
/// [`ethernity_app::Session`] autodetects.
pub fn frame_text(bytes: &[u8]) -> String {
    ethernity_codecs::encode_base64(bytes)
}

/// Split `ciphertext` into two main frames, F0 and F1.
pub fn main_frame_pair(doc_id: [u8; 16], ciphertext: &[u8]) -> (String, String) {
    let mid = ciphertext.len().div_ceil(2);
    let (first, second) = ciphertext.split_at(mid.min(ciphertext.len()));
    let encode = |index: u32, data: &[u8]| {
        let frame = Frame {
            version: FRAME_VERSION as u8,
            frame_type: FrameType::Main,
            doc_id,
            index,
            total: 2,
            data: data.to_vec(),
        };
        frame_text(&encode_frame(&frame))
    };
    (encode(0, first), encode(1, second))
}

/// A single main frame, `index` of `total`, carrying `data` verbatim.
pub fn main_frame_text(doc_id: [u8; 16], index: u32, total: u32, data: &[u8]) -> String {
    let frame = Frame { version: FRAME_VERSION as u8, frame_type: FrameType::Main, doc_id, index, total, data: data.to_vec() };
    frame_text(&encode_frame(&frame))
}

/// Printed text for an auth frame attesting `doc_hash` under `key`.
pub fn auth_frame_text(doc_id: [u8; 16], key: &SigningKey, doc_hash: [u8; 32]) -> String {
    let sign_pub = key.verifying_key().to_bytes();
    let transcript = auth_transcript(1, &doc_hash, &sign_pub);
    let signature = key.sign(&transcript).to_bytes();
    let payload = AuthPayload { version: 1, doc_hash, sign_pub, signature };
    let frame = Frame {
        version: FRAME_VERSION as u8,
        frame_type: FrameType::Auth,
        doc_id,
        index: 0,
        total: 1,
        data: encode_auth_payload(&payload),
    };
    frame_text(&encode_frame(&frame))
}

/// Split `secret` into `share_count` Shamir shares (any `threshold` of which
/// reconstruct it) and print each as a shard-frame line, bound to `doc_hash`
/// and signed by `key`.
pub fn shard_frame_texts(
    doc_id: [u8; 16],
    key: &SigningKey,
    key_type: KeyType,
    secret: &[u8],
    threshold: u32,
    share_count: u32,
    doc_hash: [u8; 32],
    coefficient_seed: u64,
) -> Vec<(u8, String)> {
    let shares = split(secret, threshold, share_count, fixed_coefficients(coefficient_seed));
    shares
        .into_iter()
        .map(|share| (share.index, shard_frame_text(doc_id, key, key_type, threshold, share_count, secret.len() as u32, doc_hash, &share)))
        .collect()
}

fn shard_frame_text(
    doc_id: [u8; 16],
    key: &SigningKey,
    key_type: KeyType,
    threshold: u32,
    share_count: u32,
    secret_len: u32,
    doc_hash: [u8; 32],
    share: &Share,
) -> String {
    let sign_pub = key.verifying_key().to_bytes();
    let fields = ShardTranscriptFields {
        version: 1,
        key_type: key_type.to_u64(),
        threshold: u64::from(threshold),
        share_count: u64::from(share_count),
        share_index: u64::from(share.index),
        secret_len: u64::from(secret_len),
        share: &share.bytes,
        doc_hash: &doc_hash,
        sign_pub: &sign_pub,
    };
    let transcript = shard_transcript(&fields);
    let signature = key.sign(&transcript).to_bytes();
    let payload = ShardPayload {
        version: 1,
        key_type,
        threshold,
        share_count,
        share_index: u32::from(share.index),
        secret_len,
        share: share.bytes.clone(),
        doc_hash,
        sign_pub,
        signature,
    };
    let frame = Frame {
        version: FRAME_VERSION as u8,
        frame_type: FrameType::Key,
        doc_id,
        index: 0,
        total: 1,
        data: encode_shard_payload(&payload),
    };
    frame_text(&encode_frame(&frame))
}

/// splitmix64, the same fixed coefficient source `ethernity-crypto`'s own
/// Shamir tests use, so shard fixtures are reproducible without pulling in
/// a general-purpose RNG for field coefficients.
fn fixed_coefficients(seed: u64) -> impl FnMut() -> u128 {
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
    move || {
        state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        let lo = z ^ (z >> 31);
        let hi = state.wrapping_mul(0xD6E8_FEB8_6659_FD93);
        (u128::from(hi) << 64) | u128::from(lo)
    }
}

/// Build a manifest-form envelope container wrapping `files` (path, bytes).
pub fn build_envelope(files: &[(&str, &[u8])], sealed: bool, seed: Option<[u8; 32]>) -> Vec<u8> {
    let entries: Vec<FileEntry> = files
        .iter()
        .map(|(path, data)| FileEntry {
            path: (*path).to_string(),
            size: data.len() as u64,
            hash: Sha256::digest(data).into(),
            mtime: None,
        })
        .collect();
    let manifest = Manifest { version: MANIFEST_VERSION, created: FIXED_CREATED, sealed, seed, files: entries };
    encode_envelope(&manifest, files)
}

/// Build a real age v1 passphrase container encrypting `plaintext` under
/// `passphrase`, with a fixed salt and STREAM nonce so output is
/// reproducible across runs.
pub fn build_age_container(passphrase: &[u8], log_n: u32, plaintext: &[u8]) -> Vec<u8> {
    let salt = [0x5Au8; SCRYPT_SALT_LEN];
    let scrypt_salt = [SCRYPT_LABEL, &salt].concat();
    let params = scrypt::Params::new(log_n as u8, 8, 1, 32).expect("log_n is within the fixture's own hard cap");
    let mut kdf_key = [0u8; 32];
    scrypt::scrypt(passphrase, &scrypt_salt, &params, &mut kdf_key).expect("scrypt with valid params succeeds");

    let file_key = [0x11u8; FILE_KEY_LEN];
    let cipher = ChaCha20Poly1305::new(Key::from_slice(&kdf_key));
    let wrapped = cipher
        .encrypt(Nonce::from_slice(&[0u8; 12]), Payload { msg: &file_key, aad: &[] })
        .expect("wrapping a 16-byte key never fails");

    let mut header = Vec::new();
    header.extend_from_slice(AGE_VERSION_LINE.as_bytes());
    header.push(b'\n');
    header.extend_from_slice(format!("-> scrypt {} {log_n}", ethernity_codecs::encode_base64(&salt)).as_bytes());
    header.push(b'\n');

    let body_b64 = ethernity_codecs::encode_base64(&wrapped);
    for chunk in body_b64.as_bytes().chunks(BODY_LINE_MAX_CHARS) {
        header.extend_from_slice(chunk);
        header.push(b'\n');
    }
    if body_b64.len() % BODY_LINE_MAX_CHARS == 0 {
        header.push(b'\n');
    }

    let hmac_key = hkdf_derive(&file_key, &[], HKDF_INFO_HEADER);
    let mut mac_calc = HmacSha256::new_from_slice(&hmac_key).expect("HMAC-SHA256 accepts any key length");
    header.extend_from_slice(FOOTER_PREFIX.as_bytes());
    mac_calc.update(&header);
    let mac = mac_calc.finalize().into_bytes();
    header.extend_from_slice(ethernity_codecs::encode_base64(&mac).as_bytes());
    header.push(b'\n');

    let stream_nonce = [0x22u8; STREAM_NONCE_LEN];
    header.extend_from_slice(&stream_nonce);

    let stream_key = hkdf_derive(&file_key, &stream_nonce, HKDF_INFO_PAYLOAD);
    let stream_cipher = ChaCha20Poly1305::new(Key::from_slice(&stream_key));

    let mut offset = 0usize;
    let mut index = 0u64;
    loop {
        let remaining = plaintext.len() - offset;
        let (chunk, is_last) = if remaining <= STREAM_CHUNK_PLAINTEXT_SIZE {
            (&plaintext[offset..], true)
        } else {
            (&plaintext[offset..offset + STREAM_CHUNK_PLAINTEXT_SIZE], false)
        };
        let nonce = chunk_nonce(index, is_last);
        let ciphertext = stream_cipher
            .encrypt(Nonce::from_slice(&nonce), Payload { msg: chunk, aad: &[] })
            .expect("stream chunk encrypts under a fresh per-chunk nonce");
        header.extend_from_slice(&ciphertext);
        offset += chunk.len();
        index += 1;
        if is_last {
            break;
        }
    }

    header
}

fn chunk_nonce(counter: u64, is_last: bool) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[3..11].copy_from_slice(&counter.to_be_bytes());
    nonce[11] = u8::from(is_last);
    nonce
}

fn hkdf_derive(ikm: &[u8], salt: &[u8], info: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut out = [0u8; 32];
    hk.expand(info, &mut out).expect("32-byte output is within HKDF-SHA256's limit");
    out
}
