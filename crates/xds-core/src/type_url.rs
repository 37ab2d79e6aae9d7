//! Type URLs of the resource kinds served by the control plane.

use std::fmt;

/// Type URL wrapper for xDS resource kinds.
///
/// Every resource kind is identified on the wire by a fixed well-known type
/// URL. Only the five kinds in [`TypeUrl::ALL`] are served.
///
/// # Example
///
/// ```rust
/// use xds_core::TypeUrl;
///
/// let cluster_type = TypeUrl::new(TypeUrl::CLUSTER);
/// assert_eq!(cluster_type.short_name(), "Cluster");
/// assert!(cluster_type.is_served());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeUrl(String);

impl TypeUrl {
    /// Type URL for Cluster (CDS).
    pub const CLUSTER: &'static str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";

    /// Type URL for ClusterLoadAssignment (EDS).
    pub const ENDPOINT: &'static str =
        "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";

    /// Type URL for Listener (LDS).
    pub const LISTENER: &'static str = "type.googleapis.com/envoy.config.listener.v3.Listener";

    /// Type URL for RouteConfiguration (RDS).
    pub const ROUTE: &'static str =
        "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

    /// Type URL for Secret (SDS).
    pub const SECRET: &'static str =
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret";

    /// Every resource kind this control plane serves.
    pub const ALL: [&'static str; 5] = [
        Self::CLUSTER,
        Self::ENDPOINT,
        Self::LISTENER,
        Self::ROUTE,
        Self::SECRET,
    ];

    /// Create a new type URL from a string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the type URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the message name from the type URL.
    ///
    /// `type.googleapis.com/envoy.config.cluster.v3.Cluster` yields `Cluster`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().and_then(|s| s.rsplit('.').next()).unwrap_or(&self.0)
    }

    /// Whether this is one of the served resource kinds.
    #[must_use]
    pub fn is_served(&self) -> bool {
        Self::ALL.contains(&self.0.as_str())
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeUrl {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TypeUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(TypeUrl::new(TypeUrl::CLUSTER).short_name(), "Cluster");
        assert_eq!(TypeUrl::new(TypeUrl::ENDPOINT).short_name(), "ClusterLoadAssignment");
        assert_eq!(TypeUrl::new(TypeUrl::SECRET).short_name(), "Secret");
    }

    #[test]
    fn test_is_served() {
        for url in TypeUrl::ALL {
            assert!(TypeUrl::new(url).is_served());
        }
        let runtime = TypeUrl::new("type.googleapis.com/envoy.service.runtime.v3.Runtime");
        assert!(!runtime.is_served());
    }
}
