//! # xds-dag
//!
//! The resolved routing graph the translator consumes.
//!
//! A [`Dag`] owns its listener roots; everything below them is reached by
//! walking [`Vertex`] values, a closed sum over the node kinds. Traversal is
//! an exhaustive `match`, so adding a node kind forces every walker to
//! handle it.
//!
//! ```rust
//! use std::sync::Arc;
//! use xds_dag::{Cluster, Dag, Listener, Route, Service, Vertex, VirtualHost};
//!
//! let svc = Arc::new(Service::new("default", "kuard", 80));
//! let dag = Dag::new().with_listener(
//!     Listener::new("ingress_http", 80).with_virtual_host(
//!         VirtualHost::new("*").with_route(Route::prefix("/").with_cluster(Cluster::new(svc))),
//!     ),
//! );
//!
//! let mut services = 0;
//! dag.walk(&mut |v| {
//!     if let Vertex::Service(_) = v {
//!         services += 1;
//!     }
//! });
//! assert_eq!(services, 1);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

mod model;

use std::sync::Arc;

pub use model::{
    CircuitBreakerThresholds, Cluster, HeaderMatch, HeaderMatchKind, HeadersPolicy,
    HealthCheckPolicy, Listener, LoadBalancerStrategy, LocalRateLimit, PathMatch, Protocol,
    RateLimitUnit, RetryPolicy, Route, SecureVirtualHost, Secret, Service, TcpProxy,
    TimeoutPolicy, TlsVersion, UpstreamValidation, VirtualHost,
};

/// A snapshot of the routing graph.
///
/// The graph is finite and acyclic by construction and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dag {
    listeners: Vec<Listener>,
    fallback_certificate: Option<Arc<Secret>>,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Certificate served to TLS clients whose SNI matches no host.
    #[must_use]
    pub fn with_fallback_certificate(mut self, secret: Arc<Secret>) -> Self {
        self.fallback_certificate = Some(secret);
        self
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn fallback_certificate(&self) -> Option<&Secret> {
        self.fallback_certificate.as_deref()
    }

    /// Call `f` on each listener root.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(Vertex<'a>)) {
        for listener in &self.listeners {
            f(Vertex::Listener(listener));
        }
    }

    /// Depth-first walk over every vertex reachable from a listener root.
    ///
    /// Shared nodes (a service referenced by two routes) are visited once per
    /// reference.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(Vertex<'a>)) {
        fn descend<'a>(vertex: Vertex<'a>, f: &mut dyn FnMut(Vertex<'a>)) {
            f(vertex);
            vertex.visit(&mut |child| descend(child, f));
        }
        self.visit(&mut |root| descend(root, f));
    }
}

/// A reference to one node of the graph.
#[derive(Debug, Clone, Copy)]
pub enum Vertex<'a> {
    Listener(&'a Listener),
    VirtualHost(&'a VirtualHost),
    SecureVirtualHost(&'a SecureVirtualHost),
    Route(&'a Route),
    Cluster(&'a Cluster),
    Service(&'a Service),
    Secret(&'a Secret),
    TcpProxy(&'a TcpProxy),
}

impl<'a> Vertex<'a> {
    /// Call `f` on each direct child of this vertex.
    pub fn visit(&self, f: &mut dyn FnMut(Vertex<'a>)) {
        match *self {
            Vertex::Listener(listener) => {
                for vhost in &listener.virtual_hosts {
                    f(Vertex::VirtualHost(vhost));
                }
                for svhost in &listener.secure_virtual_hosts {
                    f(Vertex::SecureVirtualHost(svhost));
                }
            }
            Vertex::VirtualHost(vhost) => {
                for route in &vhost.routes {
                    f(Vertex::Route(route));
                }
            }
            Vertex::SecureVirtualHost(svhost) => {
                if let Some(secret) = &svhost.secret {
                    f(Vertex::Secret(secret));
                }
                for route in &svhost.virtual_host.routes {
                    f(Vertex::Route(route));
                }
                if let Some(proxy) = &svhost.tcp_proxy {
                    f(Vertex::TcpProxy(proxy));
                }
            }
            Vertex::Route(route) => {
                for cluster in &route.clusters {
                    f(Vertex::Cluster(cluster));
                }
            }
            Vertex::Cluster(cluster) => {
                f(Vertex::Service(&cluster.upstream));
                if let Some(validation) = &cluster.upstream_validation {
                    f(Vertex::Secret(&validation.ca));
                }
            }
            Vertex::TcpProxy(proxy) => {
                for cluster in &proxy.clusters {
                    f(Vertex::Cluster(cluster));
                }
            }
            Vertex::Service(_) | Vertex::Secret(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str) -> Arc<Service> {
        Arc::new(Service::new("default", name, 80))
    }

    fn kinds(dag: &Dag) -> Vec<&'static str> {
        let mut out = Vec::new();
        dag.walk(&mut |v| {
            out.push(match v {
                Vertex::Listener(_) => "listener",
                Vertex::VirtualHost(_) => "vhost",
                Vertex::SecureVirtualHost(_) => "svhost",
                Vertex::Route(_) => "route",
                Vertex::Cluster(_) => "cluster",
                Vertex::Service(_) => "service",
                Vertex::Secret(_) => "secret",
                Vertex::TcpProxy(_) => "tcpproxy",
            })
        });
        out
    }

    #[test]
    fn empty_graph_visits_nothing() {
        assert!(kinds(&Dag::new()).is_empty());
    }

    #[test]
    fn walk_is_depth_first() {
        let dag = Dag::new().with_listener(
            Listener::new("http", 80).with_virtual_host(
                VirtualHost::new("a.example.com")
                    .with_route(Route::prefix("/").with_cluster(Cluster::new(service("a")))),
            ),
        );
        assert_eq!(
            kinds(&dag),
            ["listener", "vhost", "route", "cluster", "service"]
        );
    }

    #[test]
    fn secure_host_visits_secret_routes_and_proxy() {
        let secret = Arc::new(Secret::new("default", "tls", "cert", "key"));
        let dag = Dag::new().with_listener(
            Listener::new("https", 443).with_secure_virtual_host(
                SecureVirtualHost::new("b.example.com")
                    .with_secret(secret)
                    .with_tcp_proxy(TcpProxy::default().with_cluster(Cluster::new(service("b")))),
            ),
        );
        assert_eq!(
            kinds(&dag),
            ["listener", "svhost", "secret", "tcpproxy", "cluster", "service"]
        );
    }

    #[test]
    fn upstream_ca_is_reachable() {
        let ca = Arc::new(Secret::new("default", "ca", "ca-bundle", ""));
        let mut cluster = Cluster::new(service("c")).with_protocol(Protocol::Tls);
        cluster.upstream_validation = Some(UpstreamValidation {
            ca,
            subject_name: "c.internal".into(),
        });
        let dag = Dag::new().with_listener(
            Listener::new("http", 80).with_virtual_host(
                VirtualHost::new("*").with_route(Route::prefix("/").with_cluster(cluster)),
            ),
        );
        assert!(kinds(&dag).contains(&"secret"));
    }

    #[test]
    fn fallback_certificate_is_not_walked() {
        let dag = Dag::new()
            .with_fallback_certificate(Arc::new(Secret::new("default", "fallback", "c", "k")));
        assert!(kinds(&dag).is_empty());
        assert_eq!(dag.fallback_certificate().map(|s| s.name.as_str()), Some("fallback"));
    }
}
