//! Listeners, filter chains and network filters.

use xds_core::TypedMessage;
use xds_dag as dag;
use xds_types::base::{Address, ConfigSource, HttpProtocolOptions, TransportSocket};
use xds_types::filters::{
    http_connection_manager::{CodecType, RouteSpecifier},
    tcp_proxy, GrpcWeb, HttpConnectionManager, HttpFilter, LocalRateLimit, ProxyProtocol, Rds,
    Router, TcpProxy, TlsInspector,
};
use xds_types::listener::{
    AccessLog, FileAccessLog, Filter, FilterChain, FilterChainMatch, Listener, ListenerFilter,
};
use xds_types::tls::DownstreamTlsContext;
use xds_types::wellknown;

use super::duration;
use crate::config::TimeoutParameters;
use crate::names::cluster_name;

/// Filter chain name of the fallback certificate chain.
pub const FALLBACK_CHAIN: &str = "fallback-certificate";

pub fn listener(
    name: &str,
    address: &str,
    port: u16,
    listener_filters: Vec<ListenerFilter>,
    filter_chains: Vec<FilterChain>,
) -> Listener {
    Listener {
        name: name.to_string(),
        address: Some(Address::tcp(address, port)),
        filter_chains,
        listener_filters,
        access_log: Vec::new(),
    }
}

/// Listener filters in the order Envoy must run them: the PROXY header is
/// consumed before TLS inspection.
pub fn listener_filters(proxy_protocol: bool, tls_inspector: bool) -> Vec<ListenerFilter> {
    let mut filters = Vec::new();
    if proxy_protocol {
        filters.push(ListenerFilter::typed(wellknown::PROXY_PROTOCOL, ProxyProtocol {}.to_any()));
    }
    if tls_inspector {
        filters.push(ListenerFilter::typed(wellknown::TLS_INSPECTOR, TlsInspector {}.to_any()));
    }
    filters
}

/// Chain selected when the client's SNI equals `server_name`.
pub fn sni_filter_chain(
    server_name: &str,
    tls: &DownstreamTlsContext,
    filters: Vec<Filter>,
) -> FilterChain {
    FilterChain {
        filter_chain_match: Some(FilterChainMatch {
            server_names: vec![server_name.to_string()],
            transport_protocol: "tls".into(),
            ..Default::default()
        }),
        filters,
        transport_socket: Some(downstream_tls_socket(tls)),
        name: server_name.to_string(),
    }
}

/// Chain selected for TLS clients whose SNI matched no other chain.
pub fn fallback_filter_chain(tls: &DownstreamTlsContext, filters: Vec<Filter>) -> FilterChain {
    FilterChain {
        filter_chain_match: Some(FilterChainMatch {
            transport_protocol: "tls".into(),
            ..Default::default()
        }),
        filters,
        transport_socket: Some(downstream_tls_socket(tls)),
        name: FALLBACK_CHAIN.into(),
    }
}

fn downstream_tls_socket(tls: &DownstreamTlsContext) -> TransportSocket {
    TransportSocket::typed(wellknown::TRANSPORT_SOCKET_TLS, tls.to_any())
}

pub fn file_access_log(path: &str) -> AccessLog {
    AccessLog::typed(
        wellknown::FILE_ACCESS_LOG,
        FileAccessLog { path: path.to_string() }.to_any(),
    )
}

/// Builds an HTTP connection manager filter fed over RDS.
///
/// Filters added with [`Self::add_filter`] run after the defaults and before
/// the router, which is always last.
///
/// ```rust
/// use xds_translate::envoy::listener::HttpConnectionManagerBuilder;
///
/// let filter = HttpConnectionManagerBuilder::new("ingress_http", "ingress_xds")
///     .stat_prefix("ingress_http")
///     .default_filters()
///     .build();
/// assert_eq!(filter.name, "envoy.filters.network.http_connection_manager");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConnectionManagerBuilder {
    route_config_name: String,
    xds_cluster: String,
    stat_prefix: String,
    filters: Vec<HttpFilter>,
    timeouts: Option<TimeoutParameters>,
    access_log: Option<String>,
}

impl HttpConnectionManagerBuilder {
    pub fn new(route_config_name: impl Into<String>, xds_cluster: impl Into<String>) -> Self {
        let route_config_name = route_config_name.into();
        Self {
            stat_prefix: route_config_name.clone(),
            route_config_name,
            xds_cluster: xds_cluster.into(),
            filters: Vec::new(),
            timeouts: None,
            access_log: None,
        }
    }

    #[must_use]
    pub fn stat_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.stat_prefix = prefix.into();
        self
    }

    /// gRPC-Web bridging and the local rate limit filter, which stays inert
    /// until a route configures a bucket.
    #[must_use]
    pub fn default_filters(mut self) -> Self {
        self.filters
            .push(HttpFilter::typed(wellknown::GRPC_WEB, GrpcWeb {}.to_any()));
        self.filters.push(HttpFilter::typed(
            wellknown::LOCAL_RATE_LIMIT,
            LocalRateLimit {
                stat_prefix: "http".into(),
                ..Default::default()
            }
            .to_any(),
        ));
        self
    }

    #[must_use]
    pub fn add_filter(mut self, filter: HttpFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn timeouts(mut self, timeouts: &TimeoutParameters) -> Self {
        self.timeouts = Some(timeouts.clone());
        self
    }

    #[must_use]
    pub fn access_log(mut self, path: Option<&str>) -> Self {
        self.access_log = path.map(str::to_string);
        self
    }

    pub fn build(self) -> Filter {
        let mut http_filters = self.filters;
        http_filters.push(HttpFilter::typed(wellknown::ROUTER, Router {}.to_any()));

        let mut hcm = HttpConnectionManager {
            codec_type: CodecType::Auto as i32,
            stat_prefix: self.stat_prefix,
            route_specifier: Some(RouteSpecifier::Rds(Rds {
                config_source: Some(ConfigSource::grpc(self.xds_cluster)),
                route_config_name: self.route_config_name,
            })),
            http_filters,
            use_remote_address: Some(true),
            normalize_path: Some(true),
            access_log: self.access_log.iter().map(|p| file_access_log(p)).collect(),
            ..Default::default()
        };

        if let Some(t) = self.timeouts {
            hcm.stream_idle_timeout = t.stream_idle.map(duration);
            hcm.request_timeout = t.request.map(duration);
            hcm.drain_timeout = t.connection_shutdown_grace_period.map(duration);
            if t.connection_idle.is_some() || t.max_connection_duration.is_some() {
                hcm.common_http_protocol_options = Some(HttpProtocolOptions {
                    idle_timeout: t.connection_idle.map(duration),
                    max_connection_duration: t.max_connection_duration.map(duration),
                });
            }
        }

        Filter::typed(wellknown::HTTP_CONNECTION_MANAGER, hcm.to_any())
    }
}

/// TCP proxy filter forwarding to `proxy`'s clusters.
///
/// A single cluster is referenced directly; several are weighted, with every
/// cluster getting an equal share when no weights are set.
pub fn tcp_proxy(stat_prefix: &str, proxy: &dag::TcpProxy, access_log: Option<&str>) -> Filter {
    let cluster_specifier = match proxy.clusters.as_slice() {
        [single] => Some(tcp_proxy::ClusterSpecifier::Cluster(cluster_name(single))),
        [] => None,
        many => {
            let total = many.iter().fold(0u32, |acc, c| acc.saturating_add(c.weight));
            let mut clusters: Vec<_> = many
                .iter()
                .map(|c| tcp_proxy::weighted_cluster::ClusterWeight {
                    name: cluster_name(c),
                    weight: if total == 0 { 1 } else { c.weight },
                })
                .collect();
            clusters.sort_by(|a, b| a.name.cmp(&b.name));
            Some(tcp_proxy::ClusterSpecifier::WeightedClusters(
                tcp_proxy::WeightedCluster { clusters },
            ))
        }
    };

    let config = TcpProxy {
        stat_prefix: stat_prefix.to_string(),
        cluster_specifier,
        access_log: access_log.map(file_access_log).into_iter().collect(),
        idle_timeout: None,
    };
    Filter::typed(wellknown::TCP_PROXY, config.to_any())
}
