//! Shamir secret sharing over GF(2^128), operating on 16-byte blocks.
//!
//! The production recovery path only ever combines shares (`combine`);
//! generating shares is a write-side concern out of scope for this crate
//! (`spec.md` §1's "key generation" non-goal). [`split`] exists anyway,
//! gated to test builds, because the harness crate needs to construct
//! real Shamir shard fixtures for its end-to-end scenarios rather than
//! hand-rolling its own field arithmetic.

use crate::error::ShamirError;
use crate::gf128;

/// Size of one Shamir block, in bytes.
pub const BLOCK_SIZE: usize = 16;

/// A single share's evaluation point and payload bytes.
#[derive(Debug, Clone)]
pub struct Share {
    /// The nonzero evaluation point `x` for this share, in `1..=255`.
    pub index: u8,
    /// The share bytes, a multiple of [`BLOCK_SIZE`].
    pub bytes: Vec<u8>,
}

fn block_to_u128(block: &[u8]) -> u128 {
    let mut array = [0u8; BLOCK_SIZE];
    array.copy_from_slice(block);
    u128::from_be_bytes(array)
}

fn u128_to_block(value: u128) -> [u8; BLOCK_SIZE] {
    value.to_be_bytes()
}

/// Reconstruct a secret from exactly `threshold` distinct shares.
///
/// `shares` must already be deduplicated by index and validated for
/// matching metadata by the caller (`ethernity-core`'s shard store does
/// this); this function only performs the field arithmetic and the
/// structural checks that are purely about the share set itself: index
/// range, duplicate indices, share-length alignment, and having enough
/// shares. When more than `threshold` shares are supplied, the
/// lowest-indexed `threshold` of them are used, so the result is
/// deterministic regardless of the order `shares` arrived in. Output is
/// trimmed to `secret_len` bytes.
pub fn combine(shares: &[Share], threshold: u32, secret_len: usize) -> Result<Vec<u8>, ShamirError> {
    let mut seen = std::collections::BTreeSet::new();
    for share in shares {
        if share.index == 0 {
            return Err(ShamirError::IndexOutOfRange(u16::from(share.index)));
        }
        if !seen.insert(share.index) {
            return Err(ShamirError::DuplicateIndex(share.index));
        }
        if share.bytes.len() % BLOCK_SIZE != 0 {
            return Err(ShamirError::MisalignedShareLength(share.bytes.len()));
        }
    }

    if seen.len() < threshold as usize {
        return Err(ShamirError::InsufficientShares { threshold, supplied: seen.len() as u32 });
    }

    let block_count = secret_len.div_ceil(BLOCK_SIZE);
    let mut sorted: Vec<&Share> = shares.iter().collect();
    sorted.sort_by_key(|share| share.index);
    let used: Vec<&Share> = sorted.into_iter().take(threshold as usize).collect();

    let expected_len = block_count * BLOCK_SIZE;
    for share in &used {
        if share.bytes.len() != expected_len {
            return Err(ShamirError::MisalignedShareLength(share.bytes.len()));
        }
    }

    let mut secret = vec![0u8; expected_len];
    for block_index in 0..block_count {
        let offset = block_index * BLOCK_SIZE;
        let value = lagrange_at_zero(&used, offset);
        secret[offset..offset + BLOCK_SIZE].copy_from_slice(&u128_to_block(value));
    }

    secret.truncate(secret_len);
    Ok(secret)
}

/// Evaluate the Lagrange interpolation of `shares` at `x = 0`, for the
/// block starting at `offset` within each share's bytes.
fn lagrange_at_zero(shares: &[&Share], offset: usize) -> u128 {
    let mut total: u128 = 0;

    for (i, share_i) in shares.iter().enumerate() {
        let y_i = block_to_u128(&share_i.bytes[offset..offset + BLOCK_SIZE]);
        let mut term = y_i;

        for (j, share_j) in shares.iter().enumerate() {
            if i == j {
                continue;
            }
            let x_i = u128::from(share_i.index);
            let x_j = u128::from(share_j.index);
            // basis_j(0) factor: x_j / (x_j - x_i) = x_j / (x_j XOR x_i) in GF(2^n)
            let numerator = x_j;
            let denominator = gf128::add(x_j, x_i);
            term = gf128::mul(term, gf128::mul(numerator, gf128::inv(denominator)));
        }

        total = gf128::add(total, term);
    }

    total
}

/// Split `secret` into `share_count` shares, any `threshold` of which
/// reconstruct it. Coefficients above the constant term are drawn from
/// `coefficient_source`, one `u128` per block per coefficient.
///
/// Test-only: production code never generates shares.
#[cfg(any(test, feature = "test-support"))]
pub fn split(
    secret: &[u8],
    threshold: u32,
    share_count: u32,
    mut coefficient_source: impl FnMut() -> u128,
) -> Vec<Share> {
    assert!(threshold > 0, "threshold must be positive");
    assert!(share_count >= threshold, "share_count must be >= threshold");

    let block_count = secret.len().div_ceil(BLOCK_SIZE);
    let mut padded = secret.to_vec();
    padded.resize(block_count * BLOCK_SIZE, 0);

    // One polynomial per block: coefficients[block][0] is the secret block
    // (constant term); coefficients[block][1..threshold] are random.
    let mut coefficients: Vec<Vec<u128>> = Vec::with_capacity(block_count);
    for block_index in 0..block_count {
        let offset = block_index * BLOCK_SIZE;
        let constant = block_to_u128(&padded[offset..offset + BLOCK_SIZE]);
        let mut poly = vec![constant];
        for _ in 1..threshold {
            poly.push(coefficient_source());
        }
        coefficients.push(poly);
    }

    (1..=share_count)
        .map(|index| {
            let x = u128::from(index as u8);
            let mut bytes = Vec::with_capacity(block_count * BLOCK_SIZE);
            for poly in &coefficients {
                let y = evaluate(poly, x);
                bytes.extend_from_slice(&u128_to_block(y));
            }
            Share { index: index as u8, bytes }
        })
        .collect()
}

#[cfg(any(test, feature = "test-support"))]
fn evaluate(poly: &[u128], x: u128) -> u128 {
    // Horner's method, high-degree coefficient first.
    let mut result = 0u128;
    for coefficient in poly.iter().rev() {
        result = gf128::add(gf128::mul(result, x), *coefficient);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_rng(seed: u64) -> impl FnMut() -> u128 {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        move || {
            // splitmix64
            state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut z = state;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            let lo = z ^ (z >> 31);
            let hi = state.wrapping_mul(0xD6E8_FEB8_6659_FD93);
            (u128::from(hi) << 64) | u128::from(lo)
        }
    }

    #[test]
    fn split_then_combine_recovers_secret() {
        let secret = b"hunter2hunter".to_vec();
        let shares = split(&secret, 3, 5, fixed_rng(1));
        let chosen: Vec<Share> = shares.into_iter().take(3).collect();
        let recovered = combine(&chosen, 3, secret.len()).unwrap();
        assert_eq!(recovered, secret);
    }

    #[test]
    fn any_threshold_subset_recovers_secret() {
        let secret = b"0123456789abcdef".to_vec();
        let shares = split(&secret, 3, 5, fixed_rng(7));

        for combo in [[0, 1, 2], [1, 2, 3], [2, 3, 4], [0, 2, 4]] {
            let chosen: Vec<Share> = combo.iter().map(|&i| shares[i].clone()).collect();
            let recovered = combine(&chosen, 3, secret.len()).unwrap();
            assert_eq!(recovered, secret, "combo {combo:?} failed to reconstruct");
        }
    }

    #[test]
    fn secret_len_not_multiple_of_16_is_truncated() {
        let secret = b"hello world".to_vec(); // 11 bytes
        let shares = split(&secret, 2, 3, fixed_rng(3));
        let chosen: Vec<Share> = shares.into_iter().take(2).collect();
        let recovered = combine(&chosen, 2, secret.len()).unwrap();
        assert_eq!(recovered, secret);
        assert_eq!(recovered.len(), 11);
    }

    #[test]
    fn duplicate_index_is_rejected() {
        let secret = b"0123456789abcdef".to_vec();
        let shares = split(&secret, 2, 3, fixed_rng(4));
        let duped = vec![shares[0].clone(), shares[0].clone()];
        assert!(matches!(combine(&duped, 2, secret.len()), Err(ShamirError::DuplicateIndex(_))));
    }

    #[test]
    fn more_than_threshold_shares_use_the_lowest_indices_deterministically() {
        let secret = b"0123456789abcdef".to_vec();
        let shares = split(&secret, 3, 5, fixed_rng(11));

        // Hand the shares in reverse (highest index first) and in shuffled
        // order; both must still recover the secret and agree with each
        // other, since `combine` always picks the lowest-indexed `threshold`
        // shares regardless of the order they were supplied in.
        let mut reversed: Vec<Share> = shares.clone().into_iter().rev().collect();
        let recovered_reversed = combine(&reversed, 3, secret.len()).unwrap();
        assert_eq!(recovered_reversed, secret);

        reversed.swap(0, 2);
        let recovered_shuffled = combine(&reversed, 3, secret.len()).unwrap();
        assert_eq!(recovered_shuffled, secret);

        // Directly confirm against a hand-picked lowest-index subset.
        let lowest_three: Vec<Share> = shares.iter().take(3).cloned().collect();
        let recovered_lowest = combine(&lowest_three, 3, secret.len()).unwrap();
        assert_eq!(recovered_lowest, secret);
    }

    #[test]
    fn insufficient_shares_is_rejected() {
        let secret = b"0123456789abcdef".to_vec();
        let shares = split(&secret, 3, 5, fixed_rng(5));
        let chosen: Vec<Share> = shares.into_iter().take(2).collect();
        assert!(matches!(
            combine(&chosen, 3, secret.len()),
            Err(ShamirError::InsufficientShares { threshold: 3, supplied: 2 })
        ));
    }

    #[test]
    fn zero_index_is_rejected() {
        let bogus = Share { index: 0, bytes: vec![0u8; 16] };
        assert!(matches!(
            combine(&[bogus], 1, 16),
            Err(ShamirError::IndexOutOfRange(0))
        ));
    }

    proptest! {
        #[test]
        fn combine_recovers_secret_for_arbitrary_bytes(
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            seed in any::<u64>(),
        ) {
            let shares = split(&secret, 2, 4, fixed_rng(seed));
            let chosen: Vec<Share> = shares.into_iter().take(2).collect();
            let recovered = combine(&chosen, 2, secret.len()).unwrap();
            prop_assert_eq!(recovered, secret);
        }
    }
}
