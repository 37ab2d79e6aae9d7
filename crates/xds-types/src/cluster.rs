//! `envoy.config.cluster.v3` and upstream protocol options.

use std::collections::BTreeMap;

use prost_types::{Any, Duration};

use crate::base::{ConfigSource, HealthCheck, RoutingPriority, TransportSocket};
use crate::endpoint::ClusterLoadAssignment;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cluster {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "cluster::ClusterDiscoveryType", tags = "2")]
    pub cluster_discovery_type: Option<cluster::ClusterDiscoveryType>,
    #[prost(message, optional, tag = "3")]
    pub eds_cluster_config: Option<cluster::EdsClusterConfig>,
    #[prost(message, optional, tag = "4")]
    pub connect_timeout: Option<Duration>,
    #[prost(enumeration = "cluster::LbPolicy", tag = "6")]
    pub lb_policy: i32,
    #[prost(message, repeated, tag = "8")]
    pub health_checks: Vec<HealthCheck>,
    #[prost(message, optional, tag = "10")]
    pub circuit_breakers: Option<CircuitBreakers>,
    #[prost(enumeration = "cluster::DnsLookupFamily", tag = "17")]
    pub dns_lookup_family: i32,
    #[prost(message, optional, tag = "24")]
    pub transport_socket: Option<TransportSocket>,
    #[prost(string, tag = "28")]
    pub alt_stat_name: String,
    #[prost(message, optional, tag = "33")]
    pub load_assignment: Option<ClusterLoadAssignment>,
    #[prost(btree_map = "string, message", tag = "36")]
    pub typed_extension_protocol_options: BTreeMap<String, Any>,
}

pub mod cluster {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DiscoveryType {
        Static = 0,
        StrictDns = 1,
        LogicalDns = 2,
        Eds = 3,
        OriginalDst = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum LbPolicy {
        RoundRobin = 0,
        LeastRequest = 1,
        RingHash = 2,
        Random = 3,
        Maglev = 5,
        ClusterProvided = 6,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DnsLookupFamily {
        Auto = 0,
        V4Only = 1,
        V6Only = 2,
        V4Preferred = 3,
        All = 4,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterDiscoveryType {
        #[prost(enumeration = "DiscoveryType", tag = "2")]
        Type(i32),
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EdsClusterConfig {
        #[prost(message, optional, tag = "1")]
        pub eds_config: Option<super::ConfigSource>,
        #[prost(string, tag = "2")]
        pub service_name: String,
    }
}

impl Cluster {
    /// The discovery type, defaulting to STATIC when unset.
    pub fn discovery_type(&self) -> cluster::DiscoveryType {
        match self.cluster_discovery_type {
            Some(cluster::ClusterDiscoveryType::Type(t)) => {
                cluster::DiscoveryType::try_from(t).unwrap_or(cluster::DiscoveryType::Static)
            }
            None => cluster::DiscoveryType::Static,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CircuitBreakers {
    #[prost(message, repeated, tag = "1")]
    pub thresholds: Vec<circuit_breakers::Thresholds>,
}

pub mod circuit_breakers {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Thresholds {
        #[prost(enumeration = "super::RoutingPriority", tag = "1")]
        pub priority: i32,
        #[prost(message, optional, tag = "2")]
        pub max_connections: Option<u32>,
        #[prost(message, optional, tag = "3")]
        pub max_pending_requests: Option<u32>,
        #[prost(message, optional, tag = "4")]
        pub max_requests: Option<u32>,
        #[prost(message, optional, tag = "5")]
        pub max_retries: Option<u32>,
    }
}

/// `envoy.extensions.upstreams.http.v3.HttpProtocolOptions`, attached to a
/// cluster through `typed_extension_protocol_options`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpProtocolOptions {
    #[prost(message, optional, tag = "1")]
    pub common_http_protocol_options: Option<crate::base::HttpProtocolOptions>,
    #[prost(oneof = "http_protocol_options::UpstreamProtocolOptions", tags = "3")]
    pub upstream_protocol_options: Option<http_protocol_options::UpstreamProtocolOptions>,
}

pub mod http_protocol_options {
    use crate::base::{Http1ProtocolOptions, Http2ProtocolOptions};

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ExplicitHttpConfig {
        #[prost(oneof = "explicit_http_config::ProtocolConfig", tags = "1, 2")]
        pub protocol_config: Option<explicit_http_config::ProtocolConfig>,
    }

    pub mod explicit_http_config {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum ProtocolConfig {
            #[prost(message, tag = "1")]
            HttpProtocolOptions(super::Http1ProtocolOptions),
            #[prost(message, tag = "2")]
            Http2ProtocolOptions(super::Http2ProtocolOptions),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum UpstreamProtocolOptions {
        #[prost(message, tag = "3")]
        ExplicitHttpConfig(ExplicitHttpConfig),
    }
}
