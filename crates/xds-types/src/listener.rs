//! `envoy.config.listener.v3` and access log messages.

use prost_types::Any;

use crate::base::{Address, TransportSocket};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Listener {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub address: Option<Address>,
    #[prost(message, repeated, tag = "3")]
    pub filter_chains: Vec<FilterChain>,
    #[prost(message, repeated, tag = "9")]
    pub listener_filters: Vec<ListenerFilter>,
    #[prost(message, repeated, tag = "22")]
    pub access_log: Vec<AccessLog>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterChain {
    #[prost(message, optional, tag = "1")]
    pub filter_chain_match: Option<FilterChainMatch>,
    #[prost(message, repeated, tag = "3")]
    pub filters: Vec<Filter>,
    #[prost(message, optional, tag = "6")]
    pub transport_socket: Option<TransportSocket>,
    #[prost(string, tag = "7")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilterChainMatch {
    #[prost(string, tag = "9")]
    pub transport_protocol: String,
    #[prost(string, repeated, tag = "10")]
    pub application_protocols: Vec<String>,
    #[prost(string, repeated, tag = "11")]
    pub server_names: Vec<String>,
}

/// A network filter.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Filter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "filter::ConfigType", tags = "4")]
    pub config_type: Option<filter::ConfigType>,
}

pub mod filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

impl Filter {
    pub fn typed(name: impl Into<String>, config: Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(filter::ConfigType::TypedConfig(config)),
        }
    }

    /// The packed config, if set.
    pub fn typed_config(&self) -> Option<&Any> {
        match &self.config_type {
            Some(filter::ConfigType::TypedConfig(any)) => Some(any),
            None => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListenerFilter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "listener_filter::ConfigType", tags = "3")]
    pub config_type: Option<listener_filter::ConfigType>,
}

pub mod listener_filter {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "3")]
        TypedConfig(::prost_types::Any),
    }
}

impl ListenerFilter {
    pub fn typed(name: impl Into<String>, config: Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(listener_filter::ConfigType::TypedConfig(config)),
        }
    }
}

/// `envoy.config.accesslog.v3.AccessLog`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccessLog {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "access_log::ConfigType", tags = "4")]
    pub config_type: Option<access_log::ConfigType>,
}

pub mod access_log {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}

impl AccessLog {
    pub fn typed(name: impl Into<String>, config: Any) -> Self {
        Self {
            name: name.into(),
            config_type: Some(access_log::ConfigType::TypedConfig(config)),
        }
    }
}

/// `envoy.extensions.access_loggers.file.v3.FileAccessLog`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileAccessLog {
    #[prost(string, tag = "1")]
    pub path: String,
}
