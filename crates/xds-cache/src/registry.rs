//! Lookup of adapters by type URL.

use std::collections::BTreeMap;
use std::sync::Arc;

use xds_core::{TypeUrl, XdsError, XdsResult};

use crate::adapters::{
    ClusterCache, EndpointCache, ListenerCache, ResourceAdapter, RouteCache, SecretCache,
};

/// The caches served by one server, keyed by type URL.
///
/// ```rust
/// use xds_cache::ResourceRegistry;
/// use xds_core::TypeUrl;
///
/// let registry = ResourceRegistry::with_default_caches();
/// assert!(registry.get(TypeUrl::LISTENER).is_some());
/// assert!(registry.get("type.googleapis.com/unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    adapters: BTreeMap<&'static str, Arc<dyn ResourceAdapter>>,
}

/// Concrete handles to the five caches, for the writer side.
#[derive(Debug, Clone, Default)]
pub struct Caches {
    pub clusters: Arc<ClusterCache>,
    pub endpoints: Arc<EndpointCache>,
    pub listeners: Arc<ListenerCache>,
    pub routes: Arc<RouteCache>,
    pub secrets: Arc<SecretCache>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry serving these caches.
    pub fn registry(&self) -> ResourceRegistry {
        ResourceRegistry::new()
            .with(self.clusters.clone())
            .with(self.endpoints.clone())
            .with(self.listeners.clone())
            .with(self.routes.clone())
            .with(self.secrets.clone())
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry over five fresh caches.
    pub fn with_default_caches() -> Self {
        Caches::new().registry()
    }

    /// Add `adapter`, replacing any adapter for the same type URL.
    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn ResourceAdapter>) -> Self {
        self.adapters.insert(adapter.type_url(), adapter);
        self
    }

    pub fn get(&self, type_url: &str) -> Option<Arc<dyn ResourceAdapter>> {
        self.adapters.get(type_url).cloned()
    }

    /// Like [`Self::get`], failing with `InvalidTypeUrl` for unknown types.
    pub fn require(&self, type_url: &str) -> XdsResult<Arc<dyn ResourceAdapter>> {
        self.get(type_url)
            .ok_or_else(|| XdsError::unknown_type(type_url))
    }

    /// Registered type URLs in order.
    pub fn type_urls(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether every served kind has an adapter.
    pub fn is_complete(&self) -> bool {
        TypeUrl::ALL.iter().all(|t| self.adapters.contains_key(t))
    }
}
