//! BLAKE2b-256 document hashing.

use blake2::Blake2b;
use blake2::digest::{Digest, consts::U32};

/// BLAKE2b with a 256-bit output, no key, salt, or personalization.
type Blake2b256 = Blake2b<U32>;

/// Number of bytes in a document hash.
pub const DOC_HASH_LEN: usize = 32;

/// Hash `data` with plain BLAKE2b-256.
///
/// Used for the reassembled ciphertext's document hash (`spec` §4.3): no
/// key, no salt, no personalization, 32-byte output.
pub fn blake2b_256(data: &[u8]) -> [u8; DOC_HASH_LEN] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; DOC_HASH_LEN];
    out.copy_from_slice(&digest);
    out
}
