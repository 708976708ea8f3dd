//! age v1 passphrase-recipient decryption, single scrypt stanza only.
//!
//! Implements `spec.md` §4.5: header parsing, scrypt KDF, ChaCha20-Poly1305
//! unwrap of the file key, HMAC-SHA256 header authentication, and the
//! STREAM chunked payload decryption. No other age recipient type (X25519,
//! SSH) is supported, and only a single stanza is read.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

use ethernity_codecs::decode_base64;

use crate::constants::{
    AGE_VERSION_LINE, BODY_LINE_MAX_CHARS, FILE_KEY_LEN, HKDF_INFO_HEADER, HKDF_INFO_PAYLOAD,
    MAX_SCRYPT_LOG_N, SCRYPT_SALT_LEN, STREAM_CHUNK_PLAINTEXT_SIZE, STREAM_NONCE_LEN,
    STREAM_TAG_SIZE, WRAPPED_FILE_KEY_LEN,
};
use crate::error::AgeError;

const SCRYPT_LABEL: &[u8] = b"age-encryption.org/v1/scrypt";
const FOOTER_PREFIX: &str = "--- ";

type HmacSha256 = Hmac<Sha256>;

/// Decrypt an age v1 passphrase container with `passphrase`.
pub fn decrypt(container: &[u8], passphrase: &[u8]) -> Result<Vec<u8>, AgeError> {
    let mut pos = 0usize;

    let version_line = read_line(container, &mut pos)?;
    if version_line != AGE_VERSION_LINE.as_bytes() {
        return Err(AgeError::BadVersionLine);
    }

    let stanza_line = read_line(container, &mut pos)?;
    let (salt, log_n) = parse_stanza(stanza_line)?;

    let body = read_body(container, &mut pos)?;

    let footer_start = pos;
    let footer_line = read_line(container, &mut pos)?;
    let mac = parse_footer(footer_line)?;
    let transcript_end = footer_start + FOOTER_PREFIX.len();
    let transcript = &container[..transcript_end];

    let scrypt_salt = [SCRYPT_LABEL, &salt].concat();
    let params = scrypt::Params::new(log_n as u8, 8, 1, 32).map_err(|_| AgeError::LogNTooLarge(log_n))?;
    let mut kdf_key = [0u8; 32];
    scrypt::scrypt(passphrase, &scrypt_salt, &params, &mut kdf_key)
        .map_err(|_| AgeError::LogNTooLarge(log_n))?;

    let mut file_key = unwrap_file_key(&kdf_key, &body)?;
    kdf_key.zeroize();

    verify_header_hmac(&file_key, transcript, &mac)?;

    let nonce_start = pos;
    let nonce_end = nonce_start
        .checked_add(STREAM_NONCE_LEN)
        .filter(|&end| end <= container.len())
        .ok_or(AgeError::MalformedStreamNonce)?;
    let stream_nonce = &container[nonce_start..nonce_end];

    let mut stream_key = hkdf_derive(&file_key, stream_nonce, HKDF_INFO_PAYLOAD);
    file_key.zeroize();

    let payload = &container[nonce_end..];
    let plaintext = decrypt_stream(&stream_key, payload);
    stream_key.zeroize();

    plaintext
}

fn read_line<'a>(data: &'a [u8], pos: &mut usize) -> Result<&'a [u8], AgeError> {
    let start = *pos;
    let newline = data[start..].iter().position(|&b| b == b'\n').ok_or(AgeError::Truncated)?;
    let end = start + newline;
    *pos = end + 1;
    Ok(&data[start..end])
}

fn parse_stanza(line: &[u8]) -> Result<(Vec<u8>, u32), AgeError> {
    let text = std::str::from_utf8(line).map_err(|_| AgeError::MalformedStanza)?;
    let tokens: Vec<&str> = text.split(' ').collect();
    let [arrow, scheme, salt_b64, log_n_str] = tokens.as_slice() else {
        return Err(AgeError::MalformedStanza);
    };
    if *arrow != "->" || *scheme != "scrypt" {
        return Err(AgeError::MalformedStanza);
    }

    if log_n_str.is_empty() || (log_n_str.len() > 1 && log_n_str.starts_with('0')) {
        return Err(AgeError::MalformedStanza);
    }
    let log_n: u32 = log_n_str.parse().map_err(|_| AgeError::MalformedStanza)?;
    if log_n == 0 {
        return Err(AgeError::MalformedStanza);
    }
    if log_n > MAX_SCRYPT_LOG_N {
        return Err(AgeError::LogNTooLarge(log_n));
    }

    let salt = decode_base64(salt_b64)?;
    if salt.len() != SCRYPT_SALT_LEN {
        return Err(AgeError::MalformedStanza);
    }

    Ok((salt, log_n))
}

fn read_body(data: &[u8], pos: &mut usize) -> Result<Vec<u8>, AgeError> {
    let mut body = Vec::new();
    loop {
        let line = read_line(data, pos)?;
        let text = std::str::from_utf8(line).map_err(|_| AgeError::MalformedStanza)?;
        if text.len() > BODY_LINE_MAX_CHARS {
            return Err(AgeError::MalformedStanza);
        }
        let decoded = decode_base64(text)?;
        let is_final = text.len() < BODY_LINE_MAX_CHARS;
        body.extend_from_slice(&decoded);
        if is_final {
            break;
        }
    }

    if body.len() != WRAPPED_FILE_KEY_LEN {
        return Err(AgeError::BadBodyLength(body.len()));
    }
    Ok(body)
}

fn parse_footer(line: &[u8]) -> Result<[u8; 32], AgeError> {
    let text = std::str::from_utf8(line).map_err(|_| AgeError::MalformedFooter)?;
    let mac_b64 = text.strip_prefix(FOOTER_PREFIX).ok_or(AgeError::MalformedFooter)?;
    let decoded = decode_base64(mac_b64)?;
    decoded.try_into().map_err(|_| AgeError::MalformedFooter)
}

fn unwrap_file_key(kdf_key: &[u8; 32], body: &[u8]) -> Result<[u8; FILE_KEY_LEN], AgeError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(kdf_key));
    let nonce = Nonce::from_slice(&[0u8; 12]);
    let plaintext = cipher
        .decrypt(nonce, Payload { msg: body, aad: &[] })
        .map_err(|_| AgeError::InvalidPassphrase)?;

    plaintext.try_into().map_err(|_| AgeError::InvalidPassphrase)
}

fn hkdf_derive(ikm: &[u8], salt: &[u8], info: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut out = [0u8; 32];
    hk.expand(info, &mut out).expect("32-byte output is within HKDF-SHA256's limit");
    out
}

fn verify_header_hmac(file_key: &[u8; FILE_KEY_LEN], transcript: &[u8], mac: &[u8; 32]) -> Result<(), AgeError> {
    let hmac_key = hkdf_derive(file_key, &[], HKDF_INFO_HEADER);
    let mut verifier =
        HmacSha256::new_from_slice(&hmac_key).expect("HMAC-SHA256 accepts any key length");
    verifier.update(transcript);
    verifier.verify_slice(mac).map_err(|_| AgeError::InvalidHeaderHmac)
}

fn decrypt_stream(stream_key: &[u8; 32], payload: &[u8]) -> Result<Vec<u8>, AgeError> {
    let chunk_ciphertext_size = STREAM_CHUNK_PLAINTEXT_SIZE + STREAM_TAG_SIZE;
    let cipher = ChaCha20Poly1305::new(Key::from_slice(stream_key));

    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![&payload[0..0]]
    } else {
        let mut chunks = Vec::new();
        let mut offset = 0usize;
        while offset < payload.len() {
            let remaining = payload.len() - offset;
            if remaining <= chunk_ciphertext_size {
                chunks.push(&payload[offset..]);
                offset = payload.len();
            } else {
                chunks.push(&payload[offset..offset + chunk_ciphertext_size]);
                offset += chunk_ciphertext_size;
            }
        }
        chunks
    };

    let last_index = chunks.len() - 1;
    let mut plaintext = Vec::with_capacity(payload.len());

    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.is_empty() && chunks.len() > 1 {
            return Err(AgeError::EmptyChunk(index as u64));
        }

        let nonce = chunk_nonce(index as u64, index == last_index);
        let decrypted = cipher
            .decrypt(Nonce::from_slice(&nonce), Payload { msg: chunk, aad: &[] })
            .map_err(|_| AgeError::ChunkAuthenticationFailed(index as u64))?;
        plaintext.extend_from_slice(&decrypted);
    }

    Ok(plaintext)
}

fn chunk_nonce(counter: u64, is_last: bool) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    let counter_bytes = counter.to_be_bytes();
    // Counter is 11 bytes; `u64` only fills the low 8, leaving the top 3
    // bytes of the field at zero, which is correct for any realistic chunk
    // count (2^88 chunks is unreachable).
    nonce[3..11].copy_from_slice(&counter_bytes);
    nonce[11] = u8::from(is_last);
    nonce
}
