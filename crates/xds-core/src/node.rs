//! Proxy node identification.

use std::fmt;
use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

/// Compact identifier for the proxy on the other end of a stream.
///
/// Built from the node id and cluster reported in the first discovery
/// request, hashed with FNV-1a so log lines and metrics can carry a fixed
/// width identity.
///
/// # Example
///
/// ```rust
/// use xds_core::NodeHash;
///
/// let a = NodeHash::from_node("envoy-0", "ingress");
/// let b = NodeHash::from_node("envoy-1", "ingress");
/// assert_ne!(a, b);
/// assert_eq!(a.to_string().len(), 16);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHash(u64);

impl NodeHash {
    /// Hash a node id and its cluster.
    #[must_use]
    pub fn from_node(id: &str, cluster: &str) -> Self {
        let mut hasher = FnvHasher::default();
        id.hash(&mut hasher);
        cluster.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Get the raw hash value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_hash_deterministic() {
        assert_eq!(
            NodeHash::from_node("envoy", "ingress"),
            NodeHash::from_node("envoy", "ingress")
        );
    }

    #[test]
    fn test_cluster_is_part_of_identity() {
        assert_ne!(
            NodeHash::from_node("envoy", "ingress"),
            NodeHash::from_node("envoy", "egress")
        );
    }
}
