//! # xds-types
//!
//! Protobuf messages for the subset of the Envoy v3 API this control plane
//! emits and consumes.
//!
//! Messages are declared by hand with `prost` derives rather than generated
//! from the Envoy protos: only the fields the translator sets are present,
//! with the field numbers of the upstream definitions, so the encoded bytes
//! are valid Envoy configuration. Maps use `BTreeMap` so encoding is
//! deterministic.
//!
//! | module | proto package |
//! |---|---|
//! | [`base`] | `envoy.config.core.v3`, `envoy.type.v3` |
//! | [`matcher`] | `envoy.type.matcher.v3` |
//! | [`cluster`] | `envoy.config.cluster.v3`, `envoy.extensions.upstreams.http.v3` |
//! | [`endpoint`] | `envoy.config.endpoint.v3` |
//! | [`listener`] | `envoy.config.listener.v3`, access loggers |
//! | [`route`] | `envoy.config.route.v3` |
//! | [`tls`] | `envoy.extensions.transport_sockets.tls.v3` |
//! | [`filters`] | network, HTTP and listener filter configs |
//! | [`discovery`] | `envoy.service.discovery.v3` |
//! | [`rpc`] | `google.rpc` |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![allow(missing_docs)]

pub mod base;
pub mod cluster;
pub mod discovery;
pub mod endpoint;
pub mod filters;
pub mod listener;
pub mod matcher;
pub mod route;
pub mod rpc;
pub mod tls;

pub use prost::Message;
pub use prost_types::Any;

use xds_core::{Resource, TypeUrl, TypedMessage};

/// Names Envoy uses to select filters, transport sockets and extensions.
pub mod wellknown {
    pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";
    pub const TCP_PROXY: &str = "envoy.filters.network.tcp_proxy";
    pub const ROUTER: &str = "envoy.filters.http.router";
    pub const LUA: &str = "envoy.filters.http.lua";
    pub const GRPC_WEB: &str = "envoy.filters.http.grpc_web";
    pub const LOCAL_RATE_LIMIT: &str = "envoy.filters.http.local_ratelimit";
    pub const TLS_INSPECTOR: &str = "envoy.filters.listener.tls_inspector";
    pub const PROXY_PROTOCOL: &str = "envoy.filters.listener.proxy_protocol";
    pub const TRANSPORT_SOCKET_TLS: &str = "envoy.transport_sockets.tls";
    pub const FILE_ACCESS_LOG: &str = "envoy.access_loggers.file";
    pub const HTTP_PROTOCOL_OPTIONS: &str = "envoy.extensions.upstreams.http.v3.HttpProtocolOptions";
}

macro_rules! typed_message {
    ($($ty:ty => $url:expr,)*) => {
        $(
            impl TypedMessage for $ty {
                const TYPE_URL: &'static str = $url;
            }
        )*
    };
}

typed_message! {
    cluster::Cluster => TypeUrl::CLUSTER,
    endpoint::ClusterLoadAssignment => TypeUrl::ENDPOINT,
    listener::Listener => TypeUrl::LISTENER,
    route::RouteConfiguration => TypeUrl::ROUTE,
    tls::Secret => TypeUrl::SECRET,
    route::VirtualHost => "type.googleapis.com/envoy.config.route.v3.VirtualHost",
    cluster::HttpProtocolOptions =>
        "type.googleapis.com/envoy.extensions.upstreams.http.v3.HttpProtocolOptions",
    filters::HttpConnectionManager =>
        "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager",
    filters::TcpProxy => "type.googleapis.com/envoy.extensions.filters.network.tcp_proxy.v3.TcpProxy",
    filters::Router => "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router",
    filters::GrpcWeb => "type.googleapis.com/envoy.extensions.filters.http.grpc_web.v3.GrpcWeb",
    filters::Lua => "type.googleapis.com/envoy.extensions.filters.http.lua.v3.Lua",
    filters::LocalRateLimit =>
        "type.googleapis.com/envoy.extensions.filters.http.local_ratelimit.v3.LocalRateLimit",
    filters::TlsInspector =>
        "type.googleapis.com/envoy.extensions.filters.listener.tls_inspector.v3.TlsInspector",
    filters::ProxyProtocol =>
        "type.googleapis.com/envoy.extensions.filters.listener.proxy_protocol.v3.ProxyProtocol",
    tls::DownstreamTlsContext =>
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.DownstreamTlsContext",
    tls::UpstreamTlsContext =>
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext",
    listener::FileAccessLog =>
        "type.googleapis.com/envoy.extensions.access_loggers.file.v3.FileAccessLog",
}

impl Resource for cluster::Cluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for endpoint::ClusterLoadAssignment {
    fn name(&self) -> &str {
        &self.cluster_name
    }
}

impl Resource for listener::Listener {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for route::RouteConfiguration {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for route::VirtualHost {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Resource for tls::Secret {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Unpack an `Any` into `M`, or `None` when the type URL does not match or
/// the bytes do not decode.
pub fn unpack<M: TypedMessage + Default>(any: &Any) -> Option<M> {
    if any.type_url != M::TYPE_URL {
        return None;
    }
    M::decode(any.value.as_slice()).ok()
}
