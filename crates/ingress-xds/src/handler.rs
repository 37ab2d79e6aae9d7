//! Rebuilding the caches from a routing graph.

use parking_lot::Mutex;
use tracing::info;
use xds_cache::Caches;
use xds_core::{TypeUrl, XdsResult};
use xds_dag::Dag;
use xds_server::XdsMetrics;
use xds_translate::{ListenerConfig, Translation, Translator};

/// Cache versions after one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Versions {
    pub clusters: u64,
    pub endpoints: u64,
    pub listeners: u64,
    pub routes: u64,
    pub secrets: u64,
}

/// Translates graph snapshots into the five caches.
///
/// Rebuilds are serialized, so each one lands in every cache before the
/// next begins.
#[derive(Debug)]
pub struct CacheHandler {
    translator: Translator,
    caches: Caches,
    metrics: XdsMetrics,
    rebuild: Mutex<()>,
}

impl CacheHandler {
    pub fn new(config: ListenerConfig, caches: Caches, metrics: XdsMetrics) -> XdsResult<Self> {
        Ok(Self {
            translator: Translator::new(config)?,
            caches,
            metrics,
            rebuild: Mutex::new(()),
        })
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Translate `dag` and publish the result.
    pub fn on_change(&self, dag: &Dag) -> Versions {
        let _rebuild = self.rebuild.lock();
        let out = self.translator.translate(dag);
        self.publish(out)
    }

    fn publish(&self, out: Translation) -> Versions {
        let Translation {
            clusters,
            endpoints,
            listeners,
            routes,
            secrets,
        } = out;

        let counts = (
            clusters.len(),
            endpoints.len(),
            listeners.len(),
            routes.values().map(|rc| rc.virtual_hosts.len()).sum::<usize>(),
            secrets.len(),
        );

        // Clusters, endpoints and secrets land before the listeners and
        // routes that name them.
        let clusters = self.caches.clusters.replace(clusters);
        let endpoints = self.caches.endpoints.replace(endpoints);
        let secrets = self.caches.secrets.replace(secrets);
        let listeners = self.caches.listeners.replace(listeners);
        let routes = self.caches.routes.update_from(&routes);
        let versions = Versions {
            clusters,
            endpoints,
            listeners,
            routes,
            secrets,
        };

        for (type_url, version, count) in [
            (TypeUrl::CLUSTER, versions.clusters, counts.0),
            (TypeUrl::ENDPOINT, versions.endpoints, counts.1),
            (TypeUrl::LISTENER, versions.listeners, counts.2),
            (TypeUrl::ROUTE, versions.routes, counts.3),
            (TypeUrl::SECRET, versions.secrets, counts.4),
        ] {
            self.metrics.cache_updated(type_url, version, count);
        }

        info!(
            clusters = counts.0,
            endpoints = counts.1,
            listeners = counts.2,
            virtual_hosts = counts.3,
            secrets = counts.4,
            "rebuilt xDS caches"
        );
        versions
    }
}
