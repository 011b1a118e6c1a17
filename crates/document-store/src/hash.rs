//! SHA-256 content digests, lowercase hex.

use sha2::{Digest, Sha256};

/// Digest of the empty byte sequence. Empty content is common enough (and
/// large payloads expensive enough) that it is returned without touching
/// the hasher.
pub const EMPTY_CONTENT_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Compute the lowercase hex SHA-256 digest of `content` (64 characters).
pub fn sha256_hex(content: &[u8]) -> String {
    if content.is_empty() {
        return EMPTY_CONTENT_HASH.to_string();
    }
    hex::encode(Sha256::digest(content))
}
