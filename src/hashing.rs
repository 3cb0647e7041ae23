//! Continuum hashing
//!
//! MD5-based digest from which both continuum points and key hashes are
//! derived. Cryptographic strength is irrelevant here; what matters is a
//! well-mixed 128-bit digest so points spread uniformly over the ring.

use md5::{Digest, Md5};

/// Compute the 16-byte digest of an input byte string.
pub fn digest(input: &[u8]) -> [u8; 16] {
    Md5::digest(input).into()
}

/// Read 4 bytes of a digest starting at `offset` as a little-endian u32.
///
/// Valid offsets are 0, 4, 8 and 12; each digest therefore embeds four
/// independent ring positions.
pub fn hash32(digest: &[u8; 16], offset: usize) -> u32 {
    debug_assert!(offset % 4 == 0 && offset <= 12, "offset must be 0, 4, 8 or 12");
    let bytes: [u8; 4] = digest[offset..offset + 4]
        .try_into()
        .expect("digest slice is 4 bytes");
    u32::from_le_bytes(bytes)
}

/// Hash a lookup key to its position on the ring.
///
/// This is the value libketama exposes as `ketama_hashi`:
/// the first little-endian u32 of the key's digest.
pub fn hash_key(key: &[u8]) -> u32 {
    hash32(&digest(key), 0)
}
