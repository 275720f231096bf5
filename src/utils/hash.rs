//! Content hashing for freshness detection.
//!
//! Used by config hot-reload to skip no-op reloads when the file content
//! has not actually changed.

/// Hash content to a `u64` (first 8 bytes of the blake3 digest).
pub fn compute(content: &[u8]) -> u64 {
    let digest = blake3::hash(content);
    let bytes = digest.as_bytes();
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
