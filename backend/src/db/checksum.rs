//! Content hashing for change detection of source documents.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of a raw source document.
///
/// # Arguments
/// * `content` - Raw bytes exactly as fetched
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(result)
}
