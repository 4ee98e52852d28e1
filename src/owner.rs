//! Owner identifiers for history.
//!
//! Without a secret any non-empty string is accepted. With one, ids are issued
//! as `user_<uuid>.<signature>` and only ids carrying a matching signature
//! are accepted.

use uuid::Uuid;

use crate::hash::short_hash;

const SIGNATURE_LEN: usize = 32;

#[derive(Clone, Debug, Default)]
pub struct OwnerTokens {
    secret: Option<String>,
}

impl OwnerTokens {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.secret.is_some()
    }

    pub fn issue(&self) -> String {
        let id = format!("user_{}", Uuid::new_v4().simple());
        match &self.secret {
            Some(secret) => format!("{id}.{}", sign(secret, &id)),
            None => id,
        }
    }

    pub fn verify(&self, owner_id: &str) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };
        match owner_id.rsplit_once('.') {
            Some((id, signature)) if !id.is_empty() => {
                constant_time_eq(sign(secret, id).as_bytes(), signature.as_bytes())
            }
            _ => false,
        }
    }
}

fn sign(secret: &str, id: &str) -> String {
    short_hash(&format!("{secret}:{id}"), SIGNATURE_LEN)
}

/// Compares every byte regardless of where the first mismatch is.
fn constant_time_eq(expected: &[u8], actual: &[u8]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    expected
        .iter()
        .zip(actual)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_mode_accepts_anything() {
        let tokens = OwnerTokens::new(None);
        assert!(!tokens.is_signed());
        assert!(tokens.verify("whatever"));
        assert!(tokens.issue().starts_with("user_"));
    }

    #[test]
    fn blank_secret_means_unsigned() {
        assert!(!OwnerTokens::new(Some("  ".into())).is_signed());
    }

    #[test]
    fn signed_ids_verify_only_with_the_issuing_secret() {
        let tokens = OwnerTokens::new(Some("s3cret".into()));
        let issued = tokens.issue();
        assert!(tokens.verify(&issued));

        let other = OwnerTokens::new(Some("different".into()));
        assert!(!other.verify(&issued));

        let (id, _) = issued.rsplit_once('.').unwrap();
        assert!(!tokens.verify(id));
        assert!(!tokens.verify(&format!("{id}.00000000000000000000000000000000")));
        assert!(!tokens.verify(".abc"));
    }

    #[test]
    fn signature_comparison_checks_length_and_every_byte() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"xbcd"));
        assert!(!constant_time_eq(b"abcd", b"abc"));

        let tokens = OwnerTokens::new(Some("s3cret".into()));
        let issued = tokens.issue();
        assert!(!tokens.verify(&issued[..issued.len() - 1]));
        assert!(!tokens.verify(&format!("{issued}0")));
    }
}
