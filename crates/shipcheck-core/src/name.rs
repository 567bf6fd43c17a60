//! Release name canonicalization

use sha2::{Digest, Sha256};

/// Longest release name a storage backend accepts
pub const MAX_RELEASE_NAME_LENGTH: usize = 53;

/// Hex characters of the name hash kept in a shortened name
const HASH_LENGTH: usize = 12;

/// Shorten a release name to fit the storage key limit
///
/// Names within [`MAX_RELEASE_NAME_LENGTH`] bytes are returned unchanged.
/// Longer names keep a prefix, cut at a char boundary and stripped of
/// trailing `-` and `.`, followed by `-` and the first 12 hex characters of
/// the SHA-256 of the full name. The result always fits the limit, so
/// shortening is idempotent.
pub fn shorten_name(name: &str) -> String {
    if name.len() <= MAX_RELEASE_NAME_LENGTH {
        return name.to_string();
    }

    let mut cut = MAX_RELEASE_NAME_LENGTH - HASH_LENGTH - 1;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    let prefix = name[..cut].trim_end_matches(['-', '.']);
    let hash = hex::encode(Sha256::digest(name.as_bytes()));

    format!("{}-{}", prefix, &hash[..HASH_LENGTH])
}
