//! `envoy.extensions.transport_sockets.tls.v3` messages.

use crate::base::{ConfigSource, DataSource};
use crate::matcher::StringMatcher;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Secret {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(oneof = "secret::Type", tags = "2, 4")]
    pub r#type: Option<secret::Type>,
}

pub mod secret {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "2")]
        TlsCertificate(super::TlsCertificate),
        #[prost(message, tag = "4")]
        ValidationContext(super::CertificateValidationContext),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsCertificate {
    #[prost(message, optional, tag = "1")]
    pub certificate_chain: Option<DataSource>,
    #[prost(message, optional, tag = "2")]
    pub private_key: Option<DataSource>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsParameters {
    #[prost(enumeration = "tls_parameters::TlsProtocol", tag = "1")]
    pub tls_minimum_protocol_version: i32,
    #[prost(enumeration = "tls_parameters::TlsProtocol", tag = "2")]
    pub tls_maximum_protocol_version: i32,
    #[prost(string, repeated, tag = "3")]
    pub cipher_suites: Vec<String>,
}

pub mod tls_parameters {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum TlsProtocol {
        TlsAuto = 0,
        Tls10 = 1,
        Tls11 = 2,
        Tls12 = 3,
        Tls13 = 4,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SdsSecretConfig {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub sds_config: Option<ConfigSource>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommonTlsContext {
    #[prost(message, optional, tag = "1")]
    pub tls_params: Option<TlsParameters>,
    #[prost(string, repeated, tag = "4")]
    pub alpn_protocols: Vec<String>,
    #[prost(message, repeated, tag = "6")]
    pub tls_certificate_sds_secret_configs: Vec<SdsSecretConfig>,
    #[prost(oneof = "common_tls_context::ValidationContextType", tags = "3")]
    pub validation_context_type: Option<common_tls_context::ValidationContextType>,
}

pub mod common_tls_context {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ValidationContextType {
        #[prost(message, tag = "3")]
        ValidationContext(super::CertificateValidationContext),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CertificateValidationContext {
    #[prost(message, optional, tag = "1")]
    pub trusted_ca: Option<DataSource>,
    #[prost(message, repeated, tag = "15")]
    pub match_typed_subject_alt_names: Vec<SubjectAltNameMatcher>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubjectAltNameMatcher {
    #[prost(enumeration = "subject_alt_name_matcher::SanType", tag = "1")]
    pub san_type: i32,
    #[prost(message, optional, tag = "2")]
    pub matcher: Option<StringMatcher>,
}

pub mod subject_alt_name_matcher {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum SanType {
        Unspecified = 0,
        Email = 1,
        Dns = 2,
        Uri = 3,
        IpAddress = 4,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownstreamTlsContext {
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: Option<CommonTlsContext>,
    #[prost(message, optional, tag = "2")]
    pub require_client_certificate: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpstreamTlsContext {
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: Option<CommonTlsContext>,
    #[prost(string, tag = "2")]
    pub sni: String,
}

impl DownstreamTlsContext {
    /// Negotiated minimum protocol, `TlsAuto` when unset.
    pub fn min_protocol(&self) -> tls_parameters::TlsProtocol {
        self.common_tls_context
            .as_ref()
            .and_then(|c| c.tls_params.as_ref())
            .and_then(|p| tls_parameters::TlsProtocol::try_from(p.tls_minimum_protocol_version).ok())
            .unwrap_or(tls_parameters::TlsProtocol::TlsAuto)
    }

    /// Names of the SDS secrets this context serves.
    pub fn secret_names(&self) -> Vec<&str> {
        self.common_tls_context
            .iter()
            .flat_map(|c| c.tls_certificate_sds_secret_configs.iter())
            .map(|s| s.name.as_str())
            .collect()
    }
}
