//! Downstream and upstream TLS contexts.

use xds_dag::{TlsVersion, UpstreamValidation};
use xds_types::base::{ConfigSource, DataSource};
use xds_types::matcher::StringMatcher;
use xds_types::tls::{
    common_tls_context, subject_alt_name_matcher::SanType, tls_parameters::TlsProtocol,
    CertificateValidationContext, CommonTlsContext, DownstreamTlsContext, SdsSecretConfig,
    SubjectAltNameMatcher, TlsParameters, UpstreamTlsContext,
};

/// ALPN offered by HTTP filter chains.
pub const HTTP_ALPN: &[&str] = &["h2", "http/1.1"];

/// The effective minimum TLS version: the host's request, never below the
/// process floor.
pub fn min_tls_version(floor: TlsVersion, requested: Option<TlsVersion>) -> TlsVersion {
    requested.map_or(floor, |v| v.max(floor))
}

pub fn tls_protocol(version: TlsVersion) -> TlsProtocol {
    match version {
        TlsVersion::V1_1 => TlsProtocol::Tls11,
        TlsVersion::V1_2 => TlsProtocol::Tls12,
        TlsVersion::V1_3 => TlsProtocol::Tls13,
    }
}

/// Context terminating TLS with the certificate fetched over SDS as
/// `secret_name`.
pub fn downstream_tls_context(
    secret_name: &str,
    min_version: TlsVersion,
    xds_cluster: &str,
    alpn: &[&str],
) -> DownstreamTlsContext {
    DownstreamTlsContext {
        common_tls_context: Some(CommonTlsContext {
            tls_params: Some(TlsParameters {
                tls_minimum_protocol_version: tls_protocol(min_version) as i32,
                tls_maximum_protocol_version: TlsProtocol::Tls13 as i32,
                cipher_suites: Vec::new(),
            }),
            alpn_protocols: alpn.iter().map(|p| (*p).to_string()).collect(),
            tls_certificate_sds_secret_configs: vec![SdsSecretConfig {
                name: secret_name.to_string(),
                sds_config: Some(ConfigSource::grpc(xds_cluster)),
            }],
            validation_context_type: None,
        }),
        require_client_certificate: None,
    }
}

/// Context originating TLS to a backend, optionally verifying it against a
/// CA bundle and subject name.
pub fn upstream_tls_context(
    validation: Option<&UpstreamValidation>,
    sni: Option<&str>,
    alpn: &[&str],
) -> UpstreamTlsContext {
    let validation_context_type = validation.map(|uv| {
        common_tls_context::ValidationContextType::ValidationContext(
            CertificateValidationContext {
                trusted_ca: Some(DataSource::inline_bytes(uv.ca.certificate_chain.clone())),
                match_typed_subject_alt_names: vec![SubjectAltNameMatcher {
                    san_type: SanType::Dns as i32,
                    matcher: Some(StringMatcher::exact(&uv.subject_name)),
                }],
            },
        )
    });

    UpstreamTlsContext {
        common_tls_context: Some(CommonTlsContext {
            alpn_protocols: alpn.iter().map(|p| (*p).to_string()).collect(),
            validation_context_type,
            ..Default::default()
        }),
        sni: sni.unwrap_or_default().to_string(),
    }
}
