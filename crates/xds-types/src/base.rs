//! `envoy.config.core.v3` and `envoy.type.v3` messages.

use prost_types::{Any, Duration};

/// Identity a proxy reports on its discovery streams.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Node {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub cluster: String,
    #[prost(string, tag = "6")]
    pub user_agent_name: String,
}

/// Identifies the control plane instance that produced a response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControlPlane {
    #[prost(string, tag = "1")]
    pub identifier: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Address {
    #[prost(oneof = "address::Address", tags = "1")]
    pub address: Option<address::Address>,
}

pub mod address {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Address {
        #[prost(message, tag = "1")]
        SocketAddress(super::SocketAddress),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SocketAddress {
    #[prost(enumeration = "socket_address::Protocol", tag = "1")]
    pub protocol: i32,
    #[prost(string, tag = "2")]
    pub address: String,
    #[prost(oneof = "socket_address::PortSpecifier", tags = "3, 4")]
    pub port_specifier: Option<socket_address::PortSpecifier>,
}

pub mod socket_address {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Protocol {
        Tcp = 0,
        Udp = 1,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PortSpecifier {
        #[prost(uint32, tag = "3")]
        PortValue(u32),
        #[prost(string, tag = "4")]
        NamedPort(String),
    }
}

impl Address {
    /// A TCP socket address.
    pub fn tcp(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: Some(address::Address::SocketAddress(SocketAddress {
                protocol: socket_address::Protocol::Tcp as i32,
                address: address.into(),
                port_specifier: Some(socket_address::PortSpecifier::PortValue(u32::from(port))),
            })),
        }
    }

    /// The socket address, if this is one.
    pub fn socket_address(&self) -> Option<&SocketAddress> {
        match &self.address {
            Some(address::Address::SocketAddress(sa)) => Some(sa),
            None => None,
        }
    }
}

impl SocketAddress {
    /// The numeric port, if set.
    pub fn port(&self) -> Option<u32> {
        match &self.port_specifier {
            Some(socket_address::PortSpecifier::PortValue(p)) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigSource {
    #[prost(oneof = "config_source::ConfigSourceSpecifier", tags = "2, 3")]
    pub config_source_specifier: Option<config_source::ConfigSourceSpecifier>,
    #[prost(message, optional, tag = "4")]
    pub initial_fetch_timeout: Option<Duration>,
    #[prost(enumeration = "ApiVersion", tag = "6")]
    pub resource_api_version: i32,
}

pub mod config_source {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigSourceSpecifier {
        #[prost(message, tag = "2")]
        ApiConfigSource(super::ApiConfigSource),
        #[prost(message, tag = "3")]
        Ads(super::AggregatedConfigSource),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregatedConfigSource {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ApiVersion {
    Auto = 0,
    V2 = 1,
    V3 = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApiConfigSource {
    #[prost(enumeration = "api_config_source::ApiType", tag = "1")]
    pub api_type: i32,
    #[prost(enumeration = "ApiVersion", tag = "8")]
    pub transport_api_version: i32,
    #[prost(string, repeated, tag = "2")]
    pub cluster_names: Vec<String>,
    #[prost(message, repeated, tag = "4")]
    pub grpc_services: Vec<GrpcService>,
}

pub mod api_config_source {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ApiType {
        DeprecatedAndUnavailableDoNotUse = 0,
        Rest = 1,
        Grpc = 2,
        DeltaGrpc = 3,
        AggregatedGrpc = 5,
        AggregatedDeltaGrpc = 6,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GrpcService {
    #[prost(oneof = "grpc_service::TargetSpecifier", tags = "1")]
    pub target_specifier: Option<grpc_service::TargetSpecifier>,
    #[prost(message, optional, tag = "3")]
    pub timeout: Option<Duration>,
}

pub mod grpc_service {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct EnvoyGrpc {
        #[prost(string, tag = "1")]
        pub cluster_name: String,
        #[prost(string, tag = "2")]
        pub authority: String,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum TargetSpecifier {
        #[prost(message, tag = "1")]
        EnvoyGrpc(EnvoyGrpc),
    }
}

impl ConfigSource {
    /// A v3 gRPC config source pointing at the named static cluster.
    pub fn grpc(cluster: impl Into<String>) -> Self {
        Self {
            config_source_specifier: Some(config_source::ConfigSourceSpecifier::ApiConfigSource(
                ApiConfigSource {
                    api_type: api_config_source::ApiType::Grpc as i32,
                    transport_api_version: ApiVersion::V3 as i32,
                    cluster_names: Vec::new(),
                    grpc_services: vec![GrpcService {
                        target_specifier: Some(grpc_service::TargetSpecifier::EnvoyGrpc(
                            grpc_service::EnvoyGrpc {
                                cluster_name: cluster.into(),
                                authority: String::new(),
                            },
                        )),
                        timeout: None,
                    }],
                },
            )),
            initial_fetch_timeout: None,
            resource_api_version: ApiVersion::V3 as i32,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransportSocket {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "transport_socket::ConfigType", tags = "3")]
    pub config_type: Option<transport_socket::ConfigType>,
}

pub mod transport_socket {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "3")]
        TypedConfig(::prost_types::Any),
    }
}

impl TransportSocket {
    /// A transport socket with a packed typed config.
    pub fn typed(name: impl Into<String>, config: Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(transport_socket::ConfigType::TypedConfig(config)),
        }
    }
}

/// Inline or file-backed bytes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataSource {
    #[prost(oneof = "data_source::Specifier", tags = "1, 2, 3")]
    pub specifier: Option<data_source::Specifier>,
}

pub mod data_source {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Specifier {
        #[prost(string, tag = "1")]
        Filename(String),
        #[prost(bytes = "vec", tag = "2")]
        InlineBytes(Vec<u8>),
        #[prost(string, tag = "3")]
        InlineString(String),
    }
}

impl DataSource {
    /// Bytes carried inline in the resource.
    pub fn inline_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            specifier: Some(data_source::Specifier::InlineBytes(bytes.into())),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderValue {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderValueOption {
    #[prost(message, optional, tag = "1")]
    pub header: Option<HeaderValue>,
    #[prost(enumeration = "header_value_option::HeaderAppendAction", tag = "3")]
    pub append_action: i32,
}

pub mod header_value_option {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum HeaderAppendAction {
        AppendIfExistsOrAdd = 0,
        AddIfAbsent = 1,
        OverwriteIfExistsOrAdd = 2,
        OverwriteIfExists = 3,
    }
}

impl HeaderValueOption {
    /// Set `key` to `value`, replacing any existing value.
    pub fn overwrite(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header: Some(HeaderValue {
                key: key.into(),
                value: value.into(),
            }),
            append_action: header_value_option::HeaderAppendAction::OverwriteIfExistsOrAdd as i32,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheck {
    #[prost(message, optional, tag = "1")]
    pub timeout: Option<Duration>,
    #[prost(message, optional, tag = "2")]
    pub interval: Option<Duration>,
    #[prost(message, optional, tag = "4")]
    pub unhealthy_threshold: Option<u32>,
    #[prost(message, optional, tag = "5")]
    pub healthy_threshold: Option<u32>,
    #[prost(oneof = "health_check::HealthChecker", tags = "8")]
    pub health_checker: Option<health_check::HealthChecker>,
}

pub mod health_check {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HttpHealthCheck {
        #[prost(string, tag = "1")]
        pub host: String,
        #[prost(string, tag = "2")]
        pub path: String,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum HealthChecker {
        #[prost(message, tag = "8")]
        HttpHealthCheck(HttpHealthCheck),
    }
}

/// Connection-level HTTP settings shared by upstream and downstream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpProtocolOptions {
    #[prost(message, optional, tag = "1")]
    pub idle_timeout: Option<Duration>,
    #[prost(message, optional, tag = "3")]
    pub max_connection_duration: Option<Duration>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Http1ProtocolOptions {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Http2ProtocolOptions {
    #[prost(message, optional, tag = "2")]
    pub max_concurrent_streams: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RoutingPriority {
    Default = 0,
    High = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RuntimeFractionalPercent {
    #[prost(message, optional, tag = "1")]
    pub default_value: Option<FractionalPercent>,
    #[prost(string, tag = "2")]
    pub runtime_key: String,
}

impl RuntimeFractionalPercent {
    /// 100% with the given runtime override key.
    pub fn always(runtime_key: impl Into<String>) -> Self {
        Self {
            default_value: Some(FractionalPercent {
                numerator: 100,
                denominator: fractional_percent::DenominatorType::Hundred as i32,
            }),
            runtime_key: runtime_key.into(),
        }
    }
}

// envoy.type.v3

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FractionalPercent {
    #[prost(uint32, tag = "1")]
    pub numerator: u32,
    #[prost(enumeration = "fractional_percent::DenominatorType", tag = "2")]
    pub denominator: i32,
}

pub mod fractional_percent {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum DenominatorType {
        Hundred = 0,
        TenThousand = 1,
        Million = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TokenBucket {
    #[prost(uint32, tag = "1")]
    pub max_tokens: u32,
    #[prost(message, optional, tag = "2")]
    pub tokens_per_fill: Option<u32>,
    #[prost(message, optional, tag = "3")]
    pub fill_interval: Option<Duration>,
}

/// HTTP status; `code` is the numeric status (the proto enum values are the
/// status codes themselves).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
}
