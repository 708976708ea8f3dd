//! Bit-exact constants shared by the crypto layer (`spec.md` §6.6).

/// Domain-separation prefix for auth-frame signature transcripts.
pub const AUTH_DOMAIN: &[u8] = b"ethernity:auth:v1";

/// Domain-separation prefix for shard-frame signature transcripts.
pub const SHARD_DOMAIN: &[u8] = b"ethernity:shard:v1";

/// Hard cap on age-scrypt's `logN` parameter; larger values are refused
/// before any KDF work is attempted.
pub const MAX_SCRYPT_LOG_N: u32 = 20;

/// Plaintext size of one STREAM chunk (all but possibly the last).
pub const STREAM_CHUNK_PLAINTEXT_SIZE: usize = 65536;

/// ChaCha20-Poly1305 authentication tag size.
pub const STREAM_TAG_SIZE: usize = 16;

/// Length of an age-scrypt salt, in bytes.
pub const SCRYPT_SALT_LEN: usize = 16;

/// Length of the unwrapped file key, in bytes.
pub const FILE_KEY_LEN: usize = 16;

/// Length of the base64-decoded stanza body: the file key wrapped with
/// ChaCha20-Poly1305 (16-byte ciphertext plus 16-byte tag).
pub const WRAPPED_FILE_KEY_LEN: usize = 32;

/// Length of the STREAM nonce prefix read from the header.
pub const STREAM_NONCE_LEN: usize = 16;

/// Maximum length, in ASCII characters, of a body line before the final one.
pub const BODY_LINE_MAX_CHARS: usize = 48;

/// HKDF info string used to derive the header HMAC key.
pub const HKDF_INFO_HEADER: &[u8] = b"header";

/// HKDF info string used to derive the STREAM key.
pub const HKDF_INFO_PAYLOAD: &[u8] = b"payload";

/// The fixed first line of an age v1 file.
pub const AGE_VERSION_LINE: &str = "age-encryption.org/v1";
