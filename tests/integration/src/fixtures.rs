//! Graph builders and resource inspection helpers shared by the tests.

use std::sync::Arc;

use xds_dag::{
    Cluster, Dag, Listener, Route, SecureVirtualHost, Secret, Service, TcpProxy, TlsVersion,
    VirtualHost,
};
use xds_types::base::transport_socket;
use xds_types::filters::HttpConnectionManager;
use xds_types::listener::FilterChain;
use xds_types::route::route_action::ClusterSpecifier;
use xds_types::route::route_match::PathSpecifier;
use xds_types::tls::DownstreamTlsContext;
use xds_types::{route, unpack, wellknown};

pub fn service(name: &str, port: u16) -> Arc<Service> {
    Arc::new(
        Service::new("default", name, port)
            .with_endpoints([format!("10.0.0.{}:8080", port % 200 + 1).parse().expect("addr")]),
    )
}

pub fn secret(name: &str) -> Arc<Secret> {
    Arc::new(Secret::new("default", name, format!("{name}-CERT"), format!("{name}-KEY")))
}

pub fn ingress() -> Listener {
    Listener::new("ingress", 80)
}

/// A TLS host forwarding `/` to `svc`.
pub fn secure_host(name: &str, svc: &Arc<Service>, tls: &Arc<Secret>) -> SecureVirtualHost {
    SecureVirtualHost::new(name)
        .with_secret(tls.clone())
        .with_route(Route::prefix("/").with_cluster(Cluster::new(svc.clone())))
}

/// One TLS host that terminates and proxies TCP to `default/example:443`.
pub fn tcp_proxy_graph() -> Dag {
    let backend = service("example", 443);
    Dag::new().with_listener(
        ingress().with_secure_virtual_host(
            SecureVirtualHost::new("www.example.com")
                .with_secret(secret("secret"))
                .with_tcp_proxy(TcpProxy::default().with_cluster(Cluster::new(backend))),
        ),
    )
}

/// `n` TLS hosts inserted in reverse name order.
pub fn secure_hosts_graph(n: usize, fallback: bool) -> Dag {
    let svc = service("kuard", 80);
    let tls = secret("tls");
    let mut listener = ingress();
    for i in (0..n).rev() {
        let mut host = secure_host(&format!("host-{i:02}.example.com"), &svc, &tls);
        if fallback && i == 0 {
            host = host.with_fallback_certificate();
        }
        listener = listener.with_secure_virtual_host(host);
    }
    let dag = Dag::new().with_listener(listener);
    if fallback {
        dag.with_fallback_certificate(Arc::new(Secret::new("admin", "fallback", "FB", "FBKEY")))
    } else {
        dag
    }
}

pub fn min_tls_graph(requested: TlsVersion) -> Dag {
    let svc = service("kuard", 80);
    Dag::new().with_listener(ingress().with_secure_virtual_host(
        secure_host("www.example.com", &svc, &secret("tls")).with_min_tls_version(requested),
    ))
}

/// One wildcard host with `/`, `/path/prefix` and `/path/prefix/`.
pub fn prefix_graph() -> Dag {
    let route = |prefix: &str, svc: &str| {
        Route::prefix(prefix).with_cluster(Cluster::new(service(svc, 80)))
    };
    Dag::new().with_listener(
        ingress().with_virtual_host(
            VirtualHost::new("*")
                .with_route(route("/", "default-svc"))
                .with_route(route("/path/prefix", "prefix-svc"))
                .with_route(route("/path/prefix/", "slash-svc")),
        ),
    )
}

/// The cluster Envoy would pick for `path`, taking the first route whose
/// path condition matches.
pub fn select_cluster<'a>(vhost: &'a route::VirtualHost, path: &str) -> Option<&'a str> {
    vhost.routes.iter().find_map(|r| {
        let matched = match r.r#match.as_ref()?.path_specifier.as_ref()? {
            PathSpecifier::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathSpecifier::Path(exact) => path == exact,
            PathSpecifier::SafeRegex(_) => false,
        };
        if !matched {
            return None;
        }
        match r.route_action()?.cluster_specifier.as_ref()? {
            ClusterSpecifier::Cluster(name) => Some(name.as_str()),
            ClusterSpecifier::WeightedClusters(_) => None,
        }
    })
}

pub fn tls_context(chain: &FilterChain) -> DownstreamTlsContext {
    let socket = chain.transport_socket.as_ref().expect("tls transport socket");
    let Some(transport_socket::ConfigType::TypedConfig(any)) = &socket.config_type else {
        panic!("transport socket without typed config");
    };
    unpack(any).expect("downstream tls context")
}

pub fn connection_manager(chain: &FilterChain) -> Option<HttpConnectionManager> {
    chain
        .filters
        .iter()
        .find(|f| f.name == wellknown::HTTP_CONNECTION_MANAGER)
        .and_then(|f| f.typed_config())
        .and_then(unpack)
}
