//! SHA-256 hashing implementation
//!
//! Block hashes are hex-encoded SHA-256 digests; the wire format stores
//! them as 64-character lowercase hex strings.

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes and return the lowercase hex digest
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Check whether a hex hash satisfies a difficulty target
///
/// A hash meets difficulty `d` when its first `d` characters are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
