//! `envoy.service.discovery.v3` messages.

use crate::base::{ControlPlane, Node};
use crate::rpc::Status;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiscoveryRequest {
    /// Version of the last response the proxy accepted; empty before the
    /// first ACK.
    #[prost(string, tag = "1")]
    pub version_info: String,
    #[prost(message, optional, tag = "2")]
    pub node: Option<Node>,
    /// Subscribed resource names; empty means every resource of the kind.
    #[prost(string, repeated, tag = "3")]
    pub resource_names: Vec<String>,
    #[prost(string, tag = "4")]
    pub type_url: String,
    /// Nonce of the response this request acknowledges.
    #[prost(string, tag = "5")]
    pub response_nonce: String,
    /// Set when the proxy rejected the response named by `response_nonce`.
    #[prost(message, optional, tag = "6")]
    pub error_detail: Option<Status>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiscoveryResponse {
    #[prost(string, tag = "1")]
    pub version_info: String,
    #[prost(message, repeated, tag = "2")]
    pub resources: Vec<::prost_types::Any>,
    #[prost(bool, tag = "3")]
    pub canary: bool,
    #[prost(string, tag = "4")]
    pub type_url: String,
    #[prost(string, tag = "5")]
    pub nonce: String,
    #[prost(message, optional, tag = "6")]
    pub control_plane: Option<ControlPlane>,
}
