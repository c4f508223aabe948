use sha2::{Digest, Sha256};
use spectaguard_core::{ContentHash, HashQuality};

/// Hex characters kept from a SHA-256 digest.
const DIGEST_PREFIX_LEN: usize = 16;

/// Hash `data`, using SHA-256 when a digest is available.
///
/// Without a digest the result is a 32-bit rolling checksum, which collides
/// far more readily and is flagged as [`HashQuality::Checksum`].
#[must_use]
pub fn content_hash(data: &str, digest_available: bool) -> ContentHash {
    if digest_available {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        let mut value = hex::encode(hasher.finalize());
        value.truncate(DIGEST_PREFIX_LEN);
        ContentHash {
            value,
            quality: HashQuality::Digest,
        }
    } else {
        ContentHash {
            value: format!("{:x}", rolling_checksum(data).unsigned_abs()),
            quality: HashQuality::Checksum,
        }
    }
}

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
fn rolling_checksum(data: &str) -> i32 {
    data.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}
