//! Version tokens exchanged with proxies.

use std::fmt;

/// Cache version as carried in `version_info`.
///
/// Each resource cache counts its updates; the counter is sent to proxies as
/// a decimal string and echoed back in ACKs. Version 0 means the cache has
/// never been written.
///
/// # Example
///
/// ```rust
/// use xds_core::ResourceVersion;
///
/// let v = ResourceVersion::new(7);
/// assert_eq!(v.to_string(), "7");
/// assert_eq!(ResourceVersion::parse("7"), Some(v));
/// assert_eq!(ResourceVersion::parse(""), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceVersion(u64);

impl ResourceVersion {
    /// Create a version from a cache counter.
    #[must_use]
    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    /// Parse the `version_info` token of a request.
    ///
    /// Proxies send an empty token before their first ACK; that and any
    /// token not minted by this server yield `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        token.parse().ok().map(Self)
    }

    /// Whether the cache has never been updated.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.0 == 0
    }

    /// The raw counter.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceVersion {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
