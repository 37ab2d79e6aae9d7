//! Upstream clusters.

use std::time::Duration;

use xds_core::TypedMessage;
use xds_dag::{self as dag, LoadBalancerStrategy, Protocol};
use xds_types::base::{
    health_check, ConfigSource, HealthCheck, Http1ProtocolOptions, Http2ProtocolOptions,
    RoutingPriority, TransportSocket,
};
use xds_types::cluster::{
    circuit_breakers, cluster, http_protocol_options, CircuitBreakers, Cluster,
    HttpProtocolOptions,
};
use xds_types::wellknown;

use super::{duration, endpoint, tls};
use crate::names::{alt_stat_name, cluster_name, eds_service_name};

/// Connect timeout for every generated cluster.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// Host header sent by active health checks that do not set one.
pub const DEFAULT_HEALTH_CHECK_HOST: &str = "ingress-xds-healthcheck";

/// Build the Envoy cluster for `source`.
///
/// Backends with an external name resolve through strict DNS with an inline
/// assignment; everything else is fetched over EDS from `xds_cluster`.
pub fn cluster(source: &dag::Cluster, xds_cluster: &str) -> Cluster {
    let svc = &source.upstream;
    let name = cluster_name(source);

    let mut out = Cluster {
        alt_stat_name: alt_stat_name(svc),
        connect_timeout: Some(duration(CONNECT_TIMEOUT)),
        lb_policy: lb_policy(source.load_balancer) as i32,
        ..Default::default()
    };

    match &svc.external_name {
        Some(host) => {
            out.cluster_discovery_type = Some(cluster::ClusterDiscoveryType::Type(
                cluster::DiscoveryType::StrictDns as i32,
            ));
            out.dns_lookup_family = cluster::DnsLookupFamily::V4Only as i32;
            out.load_assignment = Some(endpoint::dns_load_assignment(&name, host, svc.port));
        }
        None => {
            out.cluster_discovery_type = Some(cluster::ClusterDiscoveryType::Type(
                cluster::DiscoveryType::Eds as i32,
            ));
            out.eds_cluster_config = Some(cluster::EdsClusterConfig {
                eds_config: Some(ConfigSource::grpc(xds_cluster)),
                service_name: eds_service_name(svc),
            });
        }
    }

    if let Some(policy) = &source.health_check {
        out.health_checks = vec![health_check(policy)];
    }

    if !svc.thresholds.is_empty() {
        out.circuit_breakers = Some(CircuitBreakers {
            thresholds: vec![circuit_breakers::Thresholds {
                priority: RoutingPriority::Default as i32,
                max_connections: svc.thresholds.max_connections,
                max_pending_requests: svc.thresholds.max_pending_requests,
                max_requests: svc.thresholds.max_requests,
                max_retries: svc.thresholds.max_retries,
            }],
        });
    }

    match source.protocol {
        Some(Protocol::H2) => {
            out.typed_extension_protocol_options
                .insert(wellknown::HTTP_PROTOCOL_OPTIONS.into(), http2_options().to_any());
            out.transport_socket = Some(upstream_tls(source, &["h2"]));
        }
        Some(Protocol::H2c) => {
            out.typed_extension_protocol_options
                .insert(wellknown::HTTP_PROTOCOL_OPTIONS.into(), http2_options().to_any());
        }
        Some(Protocol::Tls) => {
            out.typed_extension_protocol_options
                .insert(wellknown::HTTP_PROTOCOL_OPTIONS.into(), http1_options().to_any());
            out.transport_socket = Some(upstream_tls(source, &[]));
        }
        None => {}
    }

    out.name = name;
    out
}

pub fn lb_policy(strategy: LoadBalancerStrategy) -> cluster::LbPolicy {
    match strategy {
        LoadBalancerStrategy::RoundRobin => cluster::LbPolicy::RoundRobin,
        LoadBalancerStrategy::WeightedLeastRequest => cluster::LbPolicy::LeastRequest,
        LoadBalancerStrategy::Random => cluster::LbPolicy::Random,
        LoadBalancerStrategy::Cookie => cluster::LbPolicy::RingHash,
    }
}

fn health_check(policy: &dag::HealthCheckPolicy) -> HealthCheck {
    HealthCheck {
        timeout: Some(duration(policy.timeout)),
        interval: Some(duration(policy.interval)),
        unhealthy_threshold: Some(policy.unhealthy_threshold),
        healthy_threshold: Some(policy.healthy_threshold),
        health_checker: Some(health_check::HealthChecker::HttpHealthCheck(
            health_check::HttpHealthCheck {
                host: policy
                    .host
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HEALTH_CHECK_HOST.to_string()),
                path: policy.path.clone(),
            },
        )),
    }
}

fn http2_options() -> HttpProtocolOptions {
    explicit(http_protocol_options::explicit_http_config::ProtocolConfig::Http2ProtocolOptions(
        Http2ProtocolOptions::default(),
    ))
}

fn http1_options() -> HttpProtocolOptions {
    explicit(http_protocol_options::explicit_http_config::ProtocolConfig::HttpProtocolOptions(
        Http1ProtocolOptions::default(),
    ))
}

fn explicit(
    config: http_protocol_options::explicit_http_config::ProtocolConfig,
) -> HttpProtocolOptions {
    HttpProtocolOptions {
        common_http_protocol_options: None,
        upstream_protocol_options: Some(
            http_protocol_options::UpstreamProtocolOptions::ExplicitHttpConfig(
                http_protocol_options::ExplicitHttpConfig {
                    protocol_config: Some(config),
                },
            ),
        ),
    }
}

fn upstream_tls(source: &dag::Cluster, alpn: &[&str]) -> TransportSocket {
    let sni = source
        .sni
        .as_deref()
        .or_else(|| source.upstream_validation.as_ref().map(|uv| uv.subject_name.as_str()));
    let ctx = tls::upstream_tls_context(source.upstream_validation.as_ref(), sni, alpn);
    TransportSocket::typed(wellknown::TRANSPORT_SOCKET_TLS, ctx.to_any())
}
