use sha2::{Digest, Sha256};

pub fn compute_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

/// First `len` hex characters of [`compute_hash`].
pub fn short_hash(input: &str, len: usize) -> String {
    let mut hash = compute_hash(input);
    hash.truncate(len.min(hash.len()));
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let hash = compute_hash("living room");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_hash("living room"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn short_hash_is_a_prefix() {
        let full = compute_hash("owner");
        assert_eq!(short_hash("owner", 12), full[..12]);
        assert_eq!(short_hash("owner", 200), full);
    }
}
