//! Stable resource names.
//!
//! Listener and route configuration names are fixed. Cluster and secret
//! names are content addressed: they carry a short digest over the fields
//! that shape the emitted resource, so the same input always yields the same
//! name and any policy or key change yields a new one.

use std::fmt::Write;

use sha2::{Digest as _, Sha256};

/// Name of the plaintext listener.
pub const HTTP_LISTENER: &str = "ingress_http";

/// Name of the TLS listener.
pub const HTTPS_LISTENER: &str = "ingress_https";

/// Route configuration referenced by every plaintext filter chain.
pub const HTTP_ROUTE_CONFIG: &str = "ingress_http";

/// Route configuration referenced by the fallback certificate chain and
/// holding all secure virtual hosts.
pub const HTTPS_ROUTE_CONFIG: &str = "ingress_https";

/// Maximum length of a generated cluster or secret name.
pub const NAME_LIMIT: usize = 60;

/// Number of digest bytes kept in a content-addressed name.
const DIGEST_BYTES: usize = 5;

/// Length of the digest suffix used when [`hashname`] has to truncate.
const SHORT_HASH: usize = 6;

/// Incremental builder for the digest carried in content-addressed names.
///
/// The canonical serialization is: for every field, in the order they are
/// fed, its byte length as an 8-byte big-endian integer followed by the
/// bytes themselves. Absent optional fields are fed as an empty field so
/// that adjacent fields can never shift into one another. The digest is the
/// first five bytes of the SHA-256 of that stream, rendered as ten lowercase
/// hex characters.
///
/// ```rust
/// use xds_core::naming::ShortDigest;
///
/// let a = ShortDigest::new().field("RoundRobin").field("").finish();
/// let b = ShortDigest::new().field("RoundRobin").field("h2").finish();
/// assert_eq!(a.len(), 10);
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShortDigest(Sha256);

impl ShortDigest {
    /// Start an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one field.
    #[must_use]
    pub fn field(mut self, value: impl AsRef<[u8]>) -> Self {
        let value = value.as_ref();
        self.0.update((value.len() as u64).to_be_bytes());
        self.0.update(value);
        self
    }

    /// Feed an optional field, absent values count as empty.
    #[must_use]
    pub fn optional<V: AsRef<[u8]>>(self, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(v),
            None => self.field(b""),
        }
    }

    /// Render the short digest.
    pub fn finish(self) -> String {
        hex(&self.0.finalize()[..DIGEST_BYTES])
    }
}

/// Join `parts` with `/`, shortening the result to fewer than `limit`
/// characters.
///
/// When the joined name is too long, parts are truncated from the last to the
/// first, each to an equal share of the limit with a short hash of the full
/// name appended, until the result fits. If nothing fits the hash itself is
/// returned.
///
/// ```rust
/// use xds_core::naming::hashname;
///
/// assert_eq!(hashname(60, &["default", "kuard", "80"]), "default/kuard/80");
/// let long = "a".repeat(80);
/// let name = hashname(60, &["default", &long, "80"]);
/// assert!(name.len() < 60);
/// assert!(name.starts_with("default/"));
/// ```
pub fn hashname(limit: usize, parts: &[&str]) -> String {
    let joined = parts.join("/");
    if joined.len() < limit || parts.is_empty() {
        return joined;
    }

    let hash = hex(&Sha256::digest(joined.as_bytes()));
    let share = limit / parts.len();
    let mut shortened: Vec<String> = parts.iter().map(|p| (*p).to_string()).collect();
    for n in (0..shortened.len()).rev() {
        shortened[n] = truncate(share, &shortened[n], &hash[..SHORT_HASH]);
        let candidate = shortened.join("/");
        if candidate.len() < limit {
            return candidate;
        }
    }

    hash[..hash.len().min(limit)].to_string()
}

fn truncate(limit: usize, s: &str, suffix: &str) -> String {
    if limit >= s.len() {
        return s.to_string();
    }
    if limit > suffix.len() {
        return format!("{}{}", floor(s, limit - suffix.len()), suffix);
    }
    floor(s, limit).to_string()
}

fn floor(s: &str, mut end: usize) -> &str {
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
