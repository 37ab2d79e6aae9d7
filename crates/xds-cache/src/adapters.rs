//! Typed adapters between caches and the delivery protocol.
//!
//! The delivery loop only knows type URLs and encoded resources. A
//! [`ResourceAdapter`] gives it the kind's type URL, its version and its
//! resources encoded as `Any` in a stable order, and forwards waiter
//! registration to the cache(s) behind it.

use std::collections::BTreeMap;
use std::fmt::Debug;

use prost_types::Any;
use xds_core::naming::{HTTPS_ROUTE_CONFIG, HTTP_ROUTE_CONFIG};
use xds_core::{Resource, TypedMessage};
use xds_types::cluster::Cluster;
use xds_types::endpoint::ClusterLoadAssignment;
use xds_types::listener::Listener;
use xds_types::route::{RouteConfiguration, VirtualHost};
use xds_types::tls::Secret;

use crate::cache::ResourceCache;
use crate::watch::{notify_one, Notifier, WatchId};

/// One resource kind as seen by the delivery loop.
pub trait ResourceAdapter: Send + Sync + Debug {
    /// Wire type URL of the resources.
    fn type_url(&self) -> &'static str;

    /// Current version.
    fn version(&self) -> u64;

    /// The version and the resources named in `names`, sorted by name.
    /// An empty `names` selects every resource.
    fn fetch(&self, names: &[String]) -> (u64, Vec<Any>);

    /// Notify `notifier` once the version passes `last`. The value sent is
    /// only a wake-up; read [`Self::version`] or [`Self::fetch`] for the
    /// version to serve.
    fn register(&self, id: WatchId, notifier: Notifier, last: u64);

    fn cancel(&self, id: WatchId);
}

impl<T: Resource> ResourceAdapter for ResourceCache<T> {
    fn type_url(&self) -> &'static str {
        T::TYPE_URL
    }

    fn version(&self) -> u64 {
        ResourceCache::version(self)
    }

    fn fetch(&self, names: &[String]) -> (u64, Vec<Any>) {
        let snapshot = self.snapshot();
        let resources = snapshot.select(names).into_iter().map(T::to_any).collect();
        (snapshot.version().as_u64(), resources)
    }

    fn register(&self, id: WatchId, notifier: Notifier, last: u64) {
        ResourceCache::register(self, id, notifier, last);
    }

    fn cancel(&self, id: WatchId) {
        ResourceCache::cancel(self, id);
    }
}

pub type ClusterCache = ResourceCache<Cluster>;
pub type EndpointCache = ResourceCache<ClusterLoadAssignment>;
pub type ListenerCache = ResourceCache<Listener>;
pub type SecretCache = ResourceCache<Secret>;

/// Route configurations assembled from two virtual host caches.
///
/// The plaintext and TLS hosts are stored separately and combined into the
/// two fixed route configurations on every fetch. The version is the sum of
/// both cache versions, so it increases whenever either does.
#[derive(Debug, Default)]
pub struct RouteCache {
    http: ResourceCache<VirtualHost>,
    https: ResourceCache<VirtualHost>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both host sets.
    pub fn update(
        &self,
        http: impl IntoIterator<Item = VirtualHost>,
        https: impl IntoIterator<Item = VirtualHost>,
    ) -> u64 {
        self.http.update(http) + self.https.update(https)
    }

    /// Replace the hosts from already assembled route configurations,
    /// keyed by configuration name.
    pub fn update_from(&self, routes: &BTreeMap<String, RouteConfiguration>) -> u64 {
        let hosts = |name: &str| {
            routes
                .get(name)
                .map(|rc| rc.virtual_hosts.clone())
                .unwrap_or_default()
        };
        self.update(hosts(HTTP_ROUTE_CONFIG), hosts(HTTPS_ROUTE_CONFIG))
    }

    pub fn http(&self) -> &ResourceCache<VirtualHost> {
        &self.http
    }

    pub fn https(&self) -> &ResourceCache<VirtualHost> {
        &self.https
    }

    /// The two route configurations, read at one version.
    pub fn route_configurations(&self) -> (u64, Vec<RouteConfiguration>) {
        let http = self.http.snapshot();
        let https = self.https.snapshot();
        let version = http.version().as_u64() + https.version().as_u64();
        let configs = vec![
            RouteConfiguration {
                name: HTTP_ROUTE_CONFIG.to_string(),
                virtual_hosts: http.to_vec(),
            },
            RouteConfiguration {
                name: HTTPS_ROUTE_CONFIG.to_string(),
                virtual_hosts: https.to_vec(),
            },
        ];
        (version, configs)
    }
}

impl ResourceAdapter for RouteCache {
    fn type_url(&self) -> &'static str {
        RouteConfiguration::TYPE_URL
    }

    fn version(&self) -> u64 {
        self.http.version() + self.https.version()
    }

    fn fetch(&self, names: &[String]) -> (u64, Vec<Any>) {
        let (version, mut configs) = self.route_configurations();
        if !names.is_empty() {
            configs.retain(|rc| names.iter().any(|n| *n == rc.name));
        }
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        (version, configs.iter().map(TypedMessage::to_any).collect())
    }

    fn register(&self, id: WatchId, notifier: Notifier, last: u64) {
        // Each half is registered against the version read here, so an
        // update to either between the read and the registration still
        // notifies.
        let http = self.http.version();
        let https = self.https.version();
        if http + https > last {
            notify_one(&notifier, http + https);
            return;
        }
        self.http.register(id, notifier.clone(), http);
        self.https.register(id, notifier, https);
    }

    fn cancel(&self, id: WatchId) {
        self.http.cancel(id);
        self.https.cancel(id);
    }
}
