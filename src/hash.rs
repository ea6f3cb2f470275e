use sha2::{Digest, Sha256};

/// SHA-256 of the raw upload, lowercase hex (64 characters).
pub fn compute_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
