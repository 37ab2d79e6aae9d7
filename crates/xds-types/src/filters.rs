//! Network, HTTP and listener filter configs.

use prost_types::Duration;

use crate::base::{ConfigSource, HttpProtocolOptions, HttpStatus, RuntimeFractionalPercent, TokenBucket};
use crate::listener::AccessLog;

/// `envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpConnectionManager {
    #[prost(enumeration = "http_connection_manager::CodecType", tag = "1")]
    pub codec_type: i32,
    #[prost(string, tag = "2")]
    pub stat_prefix: String,
    #[prost(oneof = "http_connection_manager::RouteSpecifier", tags = "3")]
    pub route_specifier: Option<http_connection_manager::RouteSpecifier>,
    #[prost(message, repeated, tag = "5")]
    pub http_filters: Vec<HttpFilter>,
    #[prost(message, optional, tag = "12")]
    pub drain_timeout: Option<Duration>,
    #[prost(message, repeated, tag = "13")]
    pub access_log: Vec<AccessLog>,
    #[prost(message, optional, tag = "14")]
    pub use_remote_address: Option<bool>,
    #[prost(message, optional, tag = "24")]
    pub stream_idle_timeout: Option<Duration>,
    #[prost(message, optional, tag = "28")]
    pub request_timeout: Option<Duration>,
    #[prost(message, optional, tag = "30")]
    pub normalize_path: Option<bool>,
    #[prost(bool, tag = "33")]
    pub merge_slashes: bool,
    #[prost(message, optional, tag = "35")]
    pub common_http_protocol_options: Option<HttpProtocolOptions>,
}

pub mod http_connection_manager {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum CodecType {
        Auto = 0,
        Http1 = 1,
        Http2 = 2,
        Http3 = 3,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RouteSpecifier {
        #[prost(message, tag = "3")]
        Rds(super::Rds),
    }
}

impl HttpConnectionManager {
    /// Name of the RDS route configuration, if routes are fetched over RDS.
    pub fn route_config_name(&self) -> Option<&str> {
        match &self.route_specifier {
            Some(http_connection_manager::RouteSpecifier::Rds(rds)) => Some(&rds.route_config_name),
            None => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rds {
    #[prost(message, optional, tag = "1")]
    pub config_source: Option<ConfigSource>,
    #[prost(string, tag = "2")]
    pub route_config_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpFilter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "http_filter::ConfigType", tags = "4")]
    pub config_type: Option<http_filter::ConfigType>,
}

pub mod http_filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

impl HttpFilter {
    pub fn typed(name: impl Into<String>, config: ::prost_types::Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(http_filter::ConfigType::TypedConfig(config)),
        }
    }

    /// The packed config, if set.
    pub fn typed_config(&self) -> Option<&::prost_types::Any> {
        match &self.config_type {
            Some(http_filter::ConfigType::TypedConfig(any)) => Some(any),
            None => None,
        }
    }
}

/// `envoy.extensions.filters.http.router.v3.Router`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Router {}

/// `envoy.extensions.filters.http.grpc_web.v3.GrpcWeb`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GrpcWeb {}

/// `envoy.extensions.filters.http.lua.v3.Lua`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Lua {
    #[prost(string, tag = "1")]
    pub inline_code: String,
}

/// `envoy.extensions.filters.http.local_ratelimit.v3.LocalRateLimit`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LocalRateLimit {
    #[prost(string, tag = "1")]
    pub stat_prefix: String,
    #[prost(message, optional, tag = "2")]
    pub status: Option<HttpStatus>,
    #[prost(message, optional, tag = "3")]
    pub token_bucket: Option<TokenBucket>,
    #[prost(message, optional, tag = "4")]
    pub filter_enabled: Option<RuntimeFractionalPercent>,
    #[prost(message, optional, tag = "5")]
    pub filter_enforced: Option<RuntimeFractionalPercent>,
}

/// `envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TcpProxy {
    #[prost(string, tag = "1")]
    pub stat_prefix: String,
    #[prost(oneof = "tcp_proxy::ClusterSpecifier", tags = "2, 10")]
    pub cluster_specifier: Option<tcp_proxy::ClusterSpecifier>,
    #[prost(message, repeated, tag = "5")]
    pub access_log: Vec<AccessLog>,
    #[prost(message, optional, tag = "8")]
    pub idle_timeout: Option<Duration>,
}

pub mod tcp_proxy {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct WeightedCluster {
        #[prost(message, repeated, tag = "1")]
        pub clusters: Vec<weighted_cluster::ClusterWeight>,
    }

    pub mod weighted_cluster {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ClusterWeight {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(uint32, tag = "2")]
            pub weight: u32,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterSpecifier {
        #[prost(string, tag = "2")]
        Cluster(String),
        #[prost(message, tag = "10")]
        WeightedClusters(WeightedCluster),
    }
}

/// `envoy.extensions.filters.listener.tls_inspector.v3.TlsInspector`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsInspector {}

/// `envoy.extensions.filters.listener.proxy_protocol.v3.ProxyProtocol`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProxyProtocol {}
