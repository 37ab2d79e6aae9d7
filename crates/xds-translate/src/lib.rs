//! # xds-translate
//!
//! Deterministic translation of a [`Dag`] into the five Envoy resource
//! kinds.
//!
//! Each kind has its own visitor ([`clusters`], [`endpoints`],
//! [`listeners`], [`routes`], [`secrets`]) and the [`Translator`] runs them
//! all over the same graph. The output only depends on the graph and the
//! [`ListenerConfig`]: the same input always produces the same resources
//! with the same names, and nothing emitted refers to a resource that is not
//! also emitted.
//!
//! ```rust
//! use std::sync::Arc;
//! use xds_dag::{Cluster, Dag, Listener, Route, Service, VirtualHost};
//! use xds_translate::{ListenerConfig, Translator};
//!
//! let svc = Arc::new(Service::new("default", "kuard", 80));
//! let dag = Dag::new().with_listener(
//!     Listener::new("ingress_http", 80).with_virtual_host(
//!         VirtualHost::new("*").with_route(Route::prefix("/").with_cluster(Cluster::new(svc))),
//!     ),
//! );
//!
//! let translator = Translator::new(ListenerConfig::default()).unwrap();
//! let out = translator.translate(&dag);
//! assert_eq!(out.clusters.len(), 1);
//! assert_eq!(out.listeners.len(), 1);
//! assert_eq!(out.routes.len(), 2);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

mod clusters;
mod config;
mod endpoints;
pub mod envoy;
mod listeners;
pub mod names;
mod routes;
mod secrets;

use std::collections::BTreeMap;

use tracing::debug;
use xds_core::XdsResult;
use xds_dag::{Dag, SecureVirtualHost, Secret, Vertex};
use xds_types::cluster::Cluster;
use xds_types::endpoint::ClusterLoadAssignment;
use xds_types::listener::Listener;
use xds_types::route::RouteConfiguration;
use xds_types::tls;

pub use clusters::clusters;
pub use config::{ListenerConfig, ListenerParams, TimeoutParameters};
pub use endpoints::endpoints;
pub use listeners::listeners;
pub use routes::routes;
pub use secrets::secrets;

/// Resources produced from one graph, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub clusters: BTreeMap<String, Cluster>,
    pub endpoints: BTreeMap<String, ClusterLoadAssignment>,
    pub listeners: BTreeMap<String, Listener>,
    pub routes: BTreeMap<String, RouteConfiguration>,
    pub secrets: BTreeMap<String, tls::Secret>,
}

/// Runs every visitor over a graph with one listener configuration.
#[derive(Debug, Clone)]
pub struct Translator {
    config: ListenerConfig,
}

impl Translator {
    /// Fails with a configuration error if `config` cannot produce loadable
    /// listeners.
    pub fn new(config: ListenerConfig) -> XdsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    pub fn translate(&self, dag: &Dag) -> Translation {
        let out = Translation {
            clusters: clusters(dag, &self.config.xds_cluster),
            endpoints: endpoints(dag),
            listeners: listeners(dag, &self.config),
            routes: routes(dag),
            secrets: secrets(dag),
        };
        debug!(
            clusters = out.clusters.len(),
            endpoints = out.endpoints.len(),
            listeners = out.listeners.len(),
            routes = out.routes.len(),
            secrets = out.secrets.len(),
            "translated routing graph"
        );
        out
    }
}

/// Calls `f` with every virtual host, secure or not, of every listener.
pub(crate) fn for_each_host<'a>(dag: &'a Dag, mut f: impl FnMut(Vertex<'a>)) {
    dag.visit(&mut |root| root.visit(&mut f));
}

/// The certificate a secure host is served with, or `None` when the host
/// cannot be put on the TLS listener: no certificate, an incomplete one, or
/// nothing to serve.
pub(crate) fn serving_secret(svh: &SecureVirtualHost) -> Option<&Secret> {
    let secret = svh.secret.as_deref().filter(|s| s.is_valid())?;
    match &svh.tcp_proxy {
        Some(proxy) if proxy.clusters.is_empty() => None,
        None if svh.virtual_host.routes.is_empty() => None,
        _ => Some(secret),
    }
}

/// A TCP proxied host with nowhere to send its connections.
pub(crate) fn proxies_nowhere(svh: &SecureVirtualHost) -> bool {
    svh.tcp_proxy.as_ref().is_some_and(|p| p.clusters.is_empty())
}

/// The fallback certificate, when it is usable and at least one served HTTP
/// host opted in to it.
pub(crate) fn fallback_secret(dag: &Dag) -> Option<&Secret> {
    let secret = dag.fallback_certificate().filter(|s| s.is_valid())?;
    let mut wanted = false;
    for_each_host(dag, |vertex| {
        if let Vertex::SecureVirtualHost(svh) = vertex {
            wanted |= svh.fallback_certificate
                && svh.tcp_proxy.is_none()
                && serving_secret(svh).is_some();
        }
    });
    wanted.then_some(secret)
}
