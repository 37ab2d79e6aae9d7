//! Content-addressed names for clusters, endpoints and secrets.

use xds_core::naming::{hashname, ShortDigest, NAME_LIMIT};
use xds_dag::{Cluster, Secret, Service};

/// Name of the Envoy cluster for `cluster`.
///
/// `namespace/name/port/digest`, where the digest covers every policy that
/// changes the emitted cluster: load balancer strategy, health check, upstream
/// validation, protocol and SNI. Two routes to the same backend with the same
/// policy share one cluster.
pub fn cluster_name(cluster: &Cluster) -> String {
    let health_check = cluster.health_check.as_ref().map(|hc| {
        format!(
            "{}|{}|{}|{}|{}|{}",
            hc.path,
            hc.host.as_deref().unwrap_or_default(),
            hc.interval.as_millis(),
            hc.timeout.as_millis(),
            hc.unhealthy_threshold,
            hc.healthy_threshold
        )
    });
    let validation = cluster.upstream_validation.as_ref();

    let digest = ShortDigest::new()
        .field(cluster.load_balancer.as_str())
        .optional(health_check)
        .optional(validation.map(|uv| format!("{}/{}", uv.ca.namespace, uv.ca.name)))
        .optional(validation.map(|uv| uv.subject_name.as_str()))
        .optional(cluster.protocol.map(|p| p.as_str()))
        .optional(cluster.sni.as_deref())
        .finish();

    let svc = &cluster.upstream;
    hashname(NAME_LIMIT, &[&svc.namespace, &svc.name, &svc.port.to_string(), &digest])
}

/// EDS service name shared by a cluster and its load assignment.
pub fn eds_service_name(service: &Service) -> String {
    if service.port_name.is_empty() {
        format!("{}/{}", service.namespace, service.name)
    } else {
        format!("{}/{}/{}", service.namespace, service.name, service.port_name)
    }
}

/// `namespace/name/digest` where the digest covers the key material, so a
/// rotated certificate is served under a new name.
pub fn secret_name(secret: &Secret) -> String {
    let digest = ShortDigest::new()
        .field(&secret.certificate_chain)
        .field(&secret.private_key)
        .finish();
    hashname(NAME_LIMIT, &[&secret.namespace, &secret.name, &digest])
}

/// Stat-friendly name for a backend.
pub(crate) fn alt_stat_name(service: &Service) -> String {
    format!("{}_{}_{}", service.namespace, service.name, service.port)
}
