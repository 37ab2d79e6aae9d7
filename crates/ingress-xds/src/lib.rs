//! # ingress-xds
//!
//! An Envoy control plane for an ingress controller.
//!
//! A routing graph ([`dag`]) is translated ([`translate`]) into clusters,
//! endpoints, listeners, route configurations and secrets. Each kind is
//! held in a versioned cache ([`cache`]) and streamed to proxies over the
//! xDS discovery services ([`server`]), either one stream per kind or all
//! kinds over ADS.
//!
//! [`CacheHandler`] is the single writer: hand it every new graph snapshot
//! and it republishes all five caches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ingress_xds::prelude::*;
//!
//! # async fn run() -> XdsResult<()> {
//! let caches = Caches::new();
//! let metrics = XdsMetrics::new();
//! let handler = CacheHandler::new(ListenerConfig::default(), caches.clone(), metrics.clone())?;
//!
//! let server = XdsServer::builder()
//!     .registry(Arc::new(caches.registry()))
//!     .metrics(metrics)
//!     .build()?;
//!
//! handler.on_change(&Dag::new());
//! server.serve("0.0.0.0:8001".parse().unwrap()).await
//! # }
//! ```
//!
//! ## Crates
//!
//! - `xds-core` - errors, type URLs, versions and resource naming
//! - `xds-types` - the Envoy v3 messages this control plane emits
//! - `xds-dag` - the routing graph
//! - `xds-translate` - graph to Envoy resources
//! - `xds-cache` - versioned caches and waiter registration
//! - `xds-server` - the gRPC discovery services
//! - `xds-validation` - Gateway API admission checks

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

mod handler;

pub use handler::{CacheHandler, Versions};

pub use xds_cache as cache;
pub use xds_core as core;
pub use xds_dag as dag;
pub use xds_server as server;
pub use xds_translate as translate;
pub use xds_types as types;
pub use xds_validation as validation;

/// Common imports.
pub mod prelude {
    pub use crate::handler::{CacheHandler, Versions};

    pub use xds_core::{NodeHash, ResourceVersion, TypeUrl, XdsError, XdsResult};

    pub use xds_cache::{
        CacheStats, Caches, ResourceAdapter, ResourceCache, ResourceRegistry, RouteCache,
        Snapshot, Watch, WatchId,
    };

    pub use xds_dag::{
        Cluster, Dag, Listener, Route, SecureVirtualHost, Secret, Service, TcpProxy,
        VirtualHost,
    };

    pub use xds_translate::{ListenerConfig, Translation, Translator};

    pub use xds_server::{
        HealthService, ServerConfig, ShutdownController, XdsMetrics, XdsServer,
        XdsServerBuilder,
    };
}

/// Version information for this crate.
pub mod version {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub const MSRV: &str = "1.75";

    pub fn version_string() -> String {
        format!("ingress-xds {} (MSRV {})", VERSION, MSRV)
    }
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn handler_feeds_the_server_registry() {
        let caches = Caches::new();
        let handler =
            CacheHandler::new(ListenerConfig::default(), caches.clone(), XdsMetrics::new())
                .expect("handler");
        let registry = Arc::new(caches.registry());
        assert!(registry.is_complete());

        let svc = Arc::new(Service::new("default", "kuard", 80));
        handler.on_change(&Dag::new().with_listener(
            Listener::new("ingress", 80).with_virtual_host(
                VirtualHost::new("*").with_route(Route::prefix("/").with_cluster(Cluster::new(svc))),
            ),
        ));

        let adapter = registry.get(TypeUrl::CLUSTER).expect("cluster adapter");
        let (version, resources) = adapter.fetch(&[]);
        assert_eq!(version, 1);
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn server_builder_works() {
        let result = XdsServer::builder()
            .registry(Arc::new(ResourceRegistry::with_default_caches()))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn version_info() {
        assert!(super::version::version_string().starts_with("ingress-xds "));
    }
}
