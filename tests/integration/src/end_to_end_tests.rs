//! Graph to resources, checked through the translator and the caches.

use ingress_xds::CacheHandler;
use xds_cache::Caches;
use xds_core::naming::{HTTPS_LISTENER, HTTPS_ROUTE_CONFIG, HTTP_ROUTE_CONFIG};
use xds_dag::TlsVersion;
use xds_server::XdsMetrics;
use xds_translate::envoy::listener::FALLBACK_CHAIN;
use xds_translate::{ListenerConfig, Translator};
use xds_types::cluster::cluster::DiscoveryType;
use xds_types::filters::Lua;
use xds_types::tls::tls_parameters::TlsProtocol;
use xds_types::{unpack, wellknown};

use crate::fixtures::*;

fn translator() -> Translator {
    Translator::new(ListenerConfig::default()).expect("default config")
}

#[test]
fn tcp_proxied_tls_host() {
    let out = translator().translate(&tcp_proxy_graph());

    assert_eq!(out.clusters.len(), 1);
    let (name, cluster) = out.clusters.iter().next().expect("one cluster");
    assert!(name.starts_with("default/example/443/"), "{name}");
    assert_eq!(cluster.discovery_type(), DiscoveryType::Eds);
    let eds = cluster.eds_cluster_config.as_ref().expect("eds config");
    assert_eq!(eds.service_name, "default/example");

    assert_eq!(out.secrets.len(), 1);
    let secret = out.secrets.keys().next().expect("one secret");
    assert!(secret.starts_with("default/secret/"), "{secret}");

    assert_eq!(out.listeners.len(), 1);
    let listener = &out.listeners[HTTPS_LISTENER];
    let port = listener
        .address
        .as_ref()
        .and_then(|a| a.socket_address())
        .and_then(|sa| sa.port());
    assert_eq!(port, Some(8443));
    assert_eq!(listener.filter_chains.len(), 1);
    let chain_match = listener.filter_chains[0]
        .filter_chain_match
        .as_ref()
        .expect("sni match");
    assert_eq!(chain_match.server_names, ["www.example.com"]);
    assert!(listener.filter_chains[0]
        .filters
        .iter()
        .any(|f| f.name == wellknown::TCP_PROXY));
}

#[test]
fn translation_is_idempotent() {
    let translator = translator();
    let graph = secure_hosts_graph(5, true);
    let first = translator.translate(&graph);
    let second = translator.translate(&graph);
    assert_eq!(first, second);

    let encode = |out: &xds_translate::Translation| {
        out.listeners
            .values()
            .map(|l| prost::Message::encode_to_vec(l))
            .collect::<Vec<_>>()
    };
    assert_eq!(encode(&first), encode(&second));
}

#[test]
fn secure_chains_are_sorted_by_server_name() {
    let out = translator().translate(&secure_hosts_graph(4, false));
    let names: Vec<_> = out.listeners[HTTPS_LISTENER]
        .filter_chains
        .iter()
        .flat_map(|c| c.filter_chain_match.iter().flat_map(|m| m.server_names.clone()))
        .collect();
    assert_eq!(
        names,
        [
            "host-00.example.com",
            "host-01.example.com",
            "host-02.example.com",
            "host-03.example.com",
        ]
    );
}

#[test]
fn fallback_chain_is_last_and_matches_without_sni() {
    let out = translator().translate(&secure_hosts_graph(3, true));
    let chains = &out.listeners[HTTPS_LISTENER].filter_chains;
    assert_eq!(chains.len(), 4);

    let fallback = chains.last().expect("fallback chain");
    assert_eq!(fallback.name, FALLBACK_CHAIN);
    let chain_match = fallback.filter_chain_match.as_ref().expect("match");
    assert!(chain_match.server_names.is_empty());
    assert_eq!(chain_match.transport_protocol, "tls");
    assert!(chains[..3].iter().all(|c| c.name != FALLBACK_CHAIN));

    let fallback_secret = tls_context(fallback);
    for name in fallback_secret.secret_names() {
        assert!(name.starts_with("admin/fallback/"), "{name}");
    }
}

#[test]
fn fallback_needs_an_opted_in_host() {
    let mut graph = secure_hosts_graph(2, false);
    graph = graph.with_fallback_certificate(secret("fallback"));
    let out = translator().translate(&graph);
    let chains = &out.listeners[HTTPS_LISTENER].filter_chains;
    assert_eq!(chains.len(), 2);
    assert!(chains.iter().all(|c| c.name != FALLBACK_CHAIN));
}

#[test]
fn global_tls_floor_wins_over_lower_requests() {
    let config = ListenerConfig::default().with_minimum_tls_version(TlsVersion::V1_3);
    let out = Translator::new(config)
        .expect("config")
        .translate(&min_tls_graph(TlsVersion::V1_2));
    let chain = &out.listeners[HTTPS_LISTENER].filter_chains[0];
    assert_eq!(tls_context(chain).min_protocol(), TlsProtocol::Tls13);

    let out = translator().translate(&min_tls_graph(TlsVersion::V1_3));
    let chain = &out.listeners[HTTPS_LISTENER].filter_chains[0];
    assert_eq!(tls_context(chain).min_protocol(), TlsProtocol::Tls13);
}

#[test]
fn longest_prefix_selects_the_route() {
    let out = translator().translate(&prefix_graph());
    let config = &out.routes[HTTP_ROUTE_CONFIG];
    assert_eq!(config.virtual_hosts.len(), 1);
    let vhost = &config.virtual_hosts[0];
    assert_eq!(vhost.domains, ["*"]);

    let selected = |path: &str| {
        let name = select_cluster(vhost, path).expect("a route matches");
        name.split('/').nth(1).expect("service segment").to_string()
    };
    assert_eq!(selected("/"), "default-svc");
    assert_eq!(selected("/path/prefix"), "prefix-svc");
    assert_eq!(selected("/path/prefixfoo"), "prefix-svc");
    assert_eq!(selected("/path/prefix/"), "slash-svc");
    assert_eq!(selected("/path/prefix/foo"), "slash-svc");
}

#[test]
fn sni_chains_reject_misdirected_requests() {
    let out = translator().translate(&secure_hosts_graph(2, true));
    let chains = &out.listeners[HTTPS_LISTENER].filter_chains;

    for chain in chains {
        let hcm = connection_manager(chain).expect("http connection manager");
        assert_eq!(hcm.route_config_name(), Some(HTTPS_ROUTE_CONFIG));

        let lua = hcm.http_filters.iter().find(|f| f.name == wellknown::LUA);
        if chain.name == FALLBACK_CHAIN {
            assert!(lua.is_none(), "fallback chain enforces no server name");
            continue;
        }
        let lua: Lua = lua
            .and_then(|f| f.typed_config())
            .and_then(unpack)
            .expect("misdirected request filter");
        assert!(lua.inline_code.contains(&chain.name.to_ascii_lowercase()));
        assert!(lua.inline_code.contains("421"));
    }
}

#[test]
fn wildcard_chains_reject_misdirected_requests() {
    let svc = service("kuard", 80);
    let tls = secret("wildcard");
    let graph = xds_dag::Dag::new().with_listener(
        ingress()
            .with_secure_virtual_host(secure_host("*.example.com", &svc, &tls))
            .with_secure_virtual_host(secure_host("www.example.org", &svc, &tls)),
    );
    let out = translator().translate(&graph);
    let chains = &out.listeners[HTTPS_LISTENER].filter_chains;
    assert_eq!(chains.len(), 2);

    let wildcard = chains
        .iter()
        .find(|c| c.name == "*.example.com")
        .expect("wildcard chain");
    let lua: Lua = connection_manager(wildcard)
        .and_then(|hcm| hcm.http_filters.into_iter().find(|f| f.name == wellknown::LUA))
        .and_then(|f| f.typed_config().and_then(unpack))
        .expect("misdirected request filter");
    assert!(lua.inline_code.contains(r#"local suffix = ".example.com""#));
    assert!(lua.inline_code.contains("421"));
}

#[test]
fn listener_route_names_match_route_configurations() {
    let mut graph = secure_hosts_graph(2, true);
    graph = graph.with_listener(
        ingress().with_virtual_host(
            xds_dag::VirtualHost::new("plain.example.com").with_route(
                xds_dag::Route::prefix("/").with_cluster(xds_dag::Cluster::new(service("web", 80))),
            ),
        ),
    );
    let out = translator().translate(&graph);

    let mut referenced: Vec<String> = out
        .listeners
        .values()
        .flat_map(|l| l.filter_chains.iter())
        .filter_map(connection_manager)
        .filter_map(|hcm| hcm.route_config_name().map(str::to_string))
        .collect();
    referenced.sort();
    referenced.dedup();

    let emitted: Vec<_> = out.routes.keys().cloned().collect();
    assert_eq!(referenced, emitted);
    assert_eq!(emitted, [HTTP_ROUTE_CONFIG, HTTPS_ROUTE_CONFIG]);
}

#[test]
fn handler_publishes_the_translation() {
    let caches = Caches::new();
    let handler = CacheHandler::new(ListenerConfig::default(), caches.clone(), XdsMetrics::new())
        .expect("handler");
    let graph = tcp_proxy_graph();
    handler.on_change(&graph);

    let out = handler.translator().translate(&graph);
    let clusters: Vec<_> = caches.clusters.contents();
    assert_eq!(clusters, out.clusters.values().cloned().collect::<Vec<_>>());
    assert_eq!(caches.secrets.contents(), out.secrets.values().cloned().collect::<Vec<_>>());
    assert_eq!(caches.listeners.contents(), out.listeners.values().cloned().collect::<Vec<_>>());

    let (_, configs) = caches.routes.route_configurations();
    assert_eq!(configs, out.routes.values().cloned().collect::<Vec<_>>());
}
