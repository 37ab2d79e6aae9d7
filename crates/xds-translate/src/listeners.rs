//! Listener translation.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use xds_core::naming::{HTTPS_LISTENER, HTTPS_ROUTE_CONFIG, HTTP_LISTENER, HTTP_ROUTE_CONFIG};
use xds_dag::{Dag, SecureVirtualHost, Secret, Vertex};
use xds_types::listener::{Filter, FilterChain, Listener};

use crate::config::ListenerConfig;
use crate::envoy::listener::{self, HttpConnectionManagerBuilder};
use crate::envoy::{lua, tls};
use crate::names::secret_name;
use crate::{fallback_secret, for_each_host, proxies_nowhere, serving_secret};

/// The plaintext and TLS listeners, each emitted only when some host needs
/// it.
///
/// TLS filter chains are ordered by server name. The fallback certificate
/// chain, when present, is last.
pub fn listeners(dag: &Dag, config: &ListenerConfig) -> BTreeMap<String, Listener> {
    let mut plaintext = false;
    let mut secure: Vec<(&SecureVirtualHost, &Secret)> = Vec::new();

    for_each_host(dag, |vertex| match vertex {
        Vertex::VirtualHost(vh) if !vh.routes.is_empty() => plaintext = true,
        Vertex::SecureVirtualHost(svh) => match serving_secret(svh) {
            Some(secret) => secure.push((svh, secret)),
            None if proxies_nowhere(svh) => {
                warn!(vhost = %svh.name(), "omitting TCP proxied host without backend clusters")
            }
            None => debug!(vhost = %svh.name(), "omitting secure virtual host without a usable certificate"),
        },
        _ => {}
    });

    let mut out = BTreeMap::new();
    let access_log = config.access_log_path.as_deref();

    if plaintext {
        let http = &config.http;
        let hcm = HttpConnectionManagerBuilder::new(HTTP_ROUTE_CONFIG, &config.xds_cluster)
            .stat_prefix(HTTP_LISTENER)
            .default_filters()
            .timeouts(config.timeouts(http))
            .access_log(access_log)
            .build();
        let chain = FilterChain {
            filters: vec![hcm],
            ..Default::default()
        };
        out.insert(
            HTTP_LISTENER.to_string(),
            listener::listener(
                HTTP_LISTENER,
                &http.address,
                http.port,
                listener::listener_filters(config.proxy_protocol(http), false),
                vec![chain],
            ),
        );
    }

    secure.sort_by(|a, b| a.0.name().cmp(b.0.name()));
    secure.dedup_by(|later, earlier| {
        let duplicate = later.0.name() == earlier.0.name();
        if duplicate {
            warn!(vhost = %later.0.name(), "duplicate secure virtual host, keeping the first");
        }
        duplicate
    });

    if secure.is_empty() {
        return out;
    }

    let https = &config.https;
    let timeouts = config.timeouts(https);
    let mut chains: Vec<FilterChain> = secure
        .iter()
        .map(|(svh, secret)| {
            let min_version = tls::min_tls_version(config.minimum_tls_version, svh.min_tls_version);
            let (filters, alpn): (Vec<Filter>, &[&str]) = match &svh.tcp_proxy {
                Some(proxy) => (vec![listener::tcp_proxy(HTTPS_LISTENER, proxy, access_log)], &[]),
                None => {
                    let hcm = HttpConnectionManagerBuilder::new(HTTPS_ROUTE_CONFIG, &config.xds_cluster)
                        .stat_prefix(HTTPS_LISTENER)
                        .default_filters()
                        .add_filter(lua::misdirected_request_filter(svh.name()))
                        .timeouts(timeouts)
                        .access_log(access_log)
                        .build();
                    (vec![hcm], tls::HTTP_ALPN)
                }
            };
            let ctx = tls::downstream_tls_context(&secret_name(secret), min_version, &config.xds_cluster, alpn);
            listener::sni_filter_chain(svh.name(), &ctx, filters)
        })
        .collect();

    if let Some(fallback) = fallback_secret(dag) {
        let ctx = tls::downstream_tls_context(
            &secret_name(fallback),
            config.minimum_tls_version,
            &config.xds_cluster,
            tls::HTTP_ALPN,
        );
        let hcm = HttpConnectionManagerBuilder::new(HTTPS_ROUTE_CONFIG, &config.xds_cluster)
            .stat_prefix(HTTPS_LISTENER)
            .default_filters()
            .timeouts(timeouts)
            .access_log(access_log)
            .build();
        chains.push(listener::fallback_filter_chain(&ctx, vec![hcm]));
    }

    out.insert(
        HTTPS_LISTENER.to_string(),
        listener::listener(
            HTTPS_LISTENER,
            &https.address,
            https.port,
            listener::listener_filters(config.proxy_protocol(https), true),
            chains,
        ),
    );
    out
}
