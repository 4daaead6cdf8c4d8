//! Stable hashing for cover selection

use sha2::{Digest, Sha256};

/// Map `key` to a 1-based index in `1..=n`.
///
/// Uses the first 8 bytes of SHA-256 as a big-endian integer so the result is
/// identical on every platform and across runs.
pub fn stable_index(key: &str, n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let digest = Sha256::digest(key.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(head);
    (value % n as u64) as usize + 1
}
