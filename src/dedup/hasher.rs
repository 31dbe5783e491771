//! Content fingerprint hashing.
//!
//! Hashes are computed over normalized content, so byte-identical
//! normalized input always produces an identical fingerprint across calls,
//! processes, and restarts.

use sha2::{Digest, Sha256};

use super::normalizer::normalize;

/// SHA-256 content hasher for exact-duplicate detection.
///
/// # Example
///
/// ```rust
/// use knowsync::ContentHasher;
///
/// let hash = ContentHasher::hash_content("Use PostgreSQL for primary storage");
/// assert_eq!(hash.len(), 64);
///
/// // Formatting differences disappear under normalization
/// let hash2 = ContentHasher::hash_content("  Use  postgresql  for  primary  storage  ");
/// assert_eq!(hash, hash2);
/// ```
pub struct ContentHasher;

impl ContentHasher {
    /// Computes the SHA-256 hash of already-normalized content.
    ///
    /// # Returns
    ///
    /// The lowercase hex-encoded hash (64 characters).
    #[must_use]
    pub fn hash(canonical: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Normalizes raw content and hashes the result.
    ///
    /// Convenience for callers that do not need the canonical text itself.
    #[must_use]
    pub fn hash_content(raw: &str) -> String {
        Self::hash(&normalize(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_produces_64_char_hex() {
        let hash = ContentHasher::hash_content("test content");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_content_same_hash() {
        let a = ContentHasher::hash_content("Use PostgreSQL for storage");
        let b = ContentHasher::hash_content("Use PostgreSQL for storage");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_content_different_hash() {
        let a = ContentHasher::hash_content("Use PostgreSQL");
        let b = ContentHasher::hash_content("Use MySQL");
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalization_applied() {
        let a = ContentHasher::hash_content("Use PostgreSQL");
        let b = ContentHasher::hash_content("  USE    POSTGRESQL  ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_embedded_dates_ignored() {
        let a = ContentHasher::hash_content("Weekly summary 2024-01-01");
        let b = ContentHasher::hash_content("Weekly summary 2024-02-02");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_content() {
        let hash = ContentHasher::hash_content("");
        assert_eq!(hash.len(), 64);
        // SHA-256 of the empty string is a well-known constant
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_matches_prehashed_canonical() {
        let canonical = super::super::normalizer::normalize("Some  RAW   text");
        assert_eq!(
            ContentHasher::hash(&canonical),
            ContentHasher::hash_content("Some  RAW   text")
        );
    }
}
