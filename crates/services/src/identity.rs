//! # Identity Hasher
//!
//! Derives a pseudonymous identity token from a request's source address so
//! votes and flags can be deduplicated without storing the address itself.
//!
//! This is best-effort deduplication, not a security boundary: shared NATs
//! collapse many users into one identity and rotating addresses mint fresh
//! ones. Rotating the salt unlinks all historical vote/flag identities,
//! which is an intended property of the scheme.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Salt used when none is configured. Hashing still works but identities
/// are correlatable across deployments that share this default.
const FALLBACK_SALT: &str = "whisperwall-default-salt";

/// One-way pseudonymizer for request source addresses.
#[derive(Debug, Clone)]
pub struct IdentityHasher {
    salt: Vec<u8>,
    degraded: bool,
}

impl IdentityHasher {
    /// Builds a hasher from the configured salt. A missing salt falls back
    /// to a fixed default; callers stay functional but identity hashes are
    /// predictable, so this is logged loudly at startup.
    pub fn new(salt: Option<&str>) -> Self {
        match salt {
            Some(s) if !s.is_empty() => Self {
                salt: s.as_bytes().to_vec(),
                degraded: false,
            },
            _ => {
                warn!("no identity salt configured; falling back to a fixed default");
                Self {
                    salt: FALLBACK_SALT.as_bytes().to_vec(),
                    degraded: true,
                }
            }
        }
    }

    /// Whether the hasher is running on the predictable fallback salt.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// HMAC-SHA256 of the source string keyed by the salt, hex-encoded.
    /// Deterministic per (source, salt); 64 characters.
    pub fn hash(&self, source: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.salt).expect("HMAC accepts keys of any length");
        mac.update(source.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_source_and_salt_give_the_same_hash() {
        let hasher = IdentityHasher::new(Some("s3cret"));
        assert_eq!(hasher.hash("203.0.113.7"), hasher.hash("203.0.113.7"));
        assert_ne!(hasher.hash("203.0.113.7"), hasher.hash("203.0.113.8"));
    }

    #[test]
    fn rotating_the_salt_unlinks_identities() {
        let before = IdentityHasher::new(Some("salt-v1"));
        let after = IdentityHasher::new(Some("salt-v2"));
        assert_ne!(before.hash("203.0.113.7"), after.hash("203.0.113.7"));
    }

    #[test]
    fn unset_salt_degrades_but_still_hashes() {
        let hasher = IdentityHasher::new(None);
        assert!(hasher.is_degraded());
        let h = hasher.hash("203.0.113.7");
        assert_eq!(h.len(), 64);
        // Deterministic under the fallback salt too.
        assert_eq!(h, IdentityHasher::new(None).hash("203.0.113.7"));
    }

    #[test]
    fn empty_salt_counts_as_unset() {
        assert!(IdentityHasher::new(Some("")).is_degraded());
    }

    #[test]
    fn output_is_fixed_length_hex() {
        let hasher = IdentityHasher::new(Some("s3cret"));
        let h = hasher.hash("2001:db8::1");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
