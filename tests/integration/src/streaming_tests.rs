//! Discovery streams fed by graph rebuilds.

use std::sync::Arc;
use std::time::Duration;

use ingress_xds::CacheHandler;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tonic::{Code, Status};
use xds_cache::Caches;
use xds_core::naming::{HTTPS_LISTENER, HTTPS_ROUTE_CONFIG};
use xds_core::TypeUrl;
use xds_server::{ResponseStream, XdsServer, XdsServerBuilder};
use xds_translate::ListenerConfig;
use xds_types::base::Node;
use xds_types::discovery::{DiscoveryRequest, DiscoveryResponse};
use xds_types::listener::Listener;
use xds_types::route::RouteConfiguration;
use xds_types::tls::Secret;
use xds_types::unpack;

use crate::fixtures::*;

struct Plane {
    handler: CacheHandler,
    server: XdsServer,
}

fn plane() -> Plane {
    let caches = Caches::new();
    let server = XdsServerBuilder::new()
        .registry(Arc::new(caches.registry()))
        .grace_period(Duration::from_millis(200))
        .build()
        .expect("server");
    let handler = CacheHandler::new(ListenerConfig::default(), caches, server.metrics().clone())
        .expect("handler");
    Plane { handler, server }
}

struct Envoy {
    node: Node,
    requests: mpsc::Sender<Result<DiscoveryRequest, Status>>,
    responses: ResponseStream,
}

impl Envoy {
    fn ads(plane: &Plane, id: &str) -> Self {
        let (requests, rx) = mpsc::channel(16);
        Self {
            node: Node {
                id: id.to_string(),
                cluster: "ingress".to_string(),
                ..Default::default()
            },
            requests,
            responses: plane.server.services().ads.open_stream(ReceiverStream::new(rx)),
        }
    }

    async fn request(&self, type_url: &str, names: &[&str], ack: Option<&DiscoveryResponse>) {
        let request = DiscoveryRequest {
            node: Some(self.node.clone()),
            type_url: type_url.to_string(),
            resource_names: names.iter().map(|n| n.to_string()).collect(),
            version_info: ack.map(|r| r.version_info.clone()).unwrap_or_default(),
            response_nonce: ack.map(|r| r.nonce.clone()).unwrap_or_default(),
            ..Default::default()
        };
        self.requests.send(Ok(request)).await.expect("stream open");
    }

    async fn next(&mut self) -> Result<DiscoveryResponse, Status> {
        tokio::time::timeout(Duration::from_secs(1), self.responses.next())
            .await
            .expect("response expected")
            .expect("stream open")
    }

    async fn response(&mut self) -> DiscoveryResponse {
        self.next().await.expect("not an error")
    }

    async fn quiet(&mut self) {
        let next = tokio::time::timeout(Duration::from_millis(50), self.responses.next()).await;
        assert!(next.is_err(), "unexpected response {next:?}");
    }
}

#[tokio::test]
async fn proxy_follows_graph_rebuilds() {
    let plane = plane();
    plane.handler.on_change(&tcp_proxy_graph());

    let mut envoy = Envoy::ads(&plane, "envoy-0");
    envoy.request(TypeUrl::LISTENER, &[], None).await;
    let listeners = envoy.response().await;
    let listener: Listener = unpack(&listeners.resources[0]).expect("listener");
    assert_eq!(listener.name, HTTPS_LISTENER);
    assert_eq!(listener.filter_chains.len(), 1);

    envoy.request(TypeUrl::LISTENER, &[], Some(&listeners)).await;
    envoy.quiet().await;

    plane.handler.on_change(&secure_hosts_graph(3, false));
    let update = envoy.response().await;
    assert!(update.version_info.parse::<u64>().expect("numeric") > listeners.version_info.parse::<u64>().expect("numeric"));
    let listener: Listener = unpack(&update.resources[0]).expect("listener");
    assert_eq!(listener.filter_chains.len(), 3);
}

#[tokio::test]
async fn secrets_and_routes_are_served_by_name() {
    let plane = plane();
    plane.handler.on_change(&secure_hosts_graph(2, false));
    let secret_names: Vec<String> = plane.handler.caches().secrets.contents().into_iter().map(|s| s.name).collect();
    assert_eq!(secret_names.len(), 1);

    let mut envoy = Envoy::ads(&plane, "envoy-0");
    envoy.request(TypeUrl::SECRET, &[secret_names[0].as_str()], None).await;
    let secrets = envoy.response().await;
    let secret: Secret = unpack(&secrets.resources[0]).expect("secret");
    assert_eq!(secret.name, secret_names[0]);

    envoy.request(TypeUrl::ROUTE, &[HTTPS_ROUTE_CONFIG], None).await;
    let routes = envoy.response().await;
    assert_eq!(routes.resources.len(), 1);
    let config: RouteConfiguration = unpack(&routes.resources[0]).expect("route configuration");
    assert_eq!(config.name, HTTPS_ROUTE_CONFIG);
    assert_eq!(config.virtual_hosts.len(), 2);
}

#[tokio::test]
async fn unchanged_graph_still_reaches_waiting_proxies() {
    let plane = plane();
    let graph = secure_hosts_graph(1, false);
    plane.handler.on_change(&graph);

    let mut envoy = Envoy::ads(&plane, "envoy-0");
    envoy.request(TypeUrl::CLUSTER, &[], None).await;
    let first = envoy.response().await;
    envoy.request(TypeUrl::CLUSTER, &[], Some(&first)).await;

    plane.handler.on_change(&graph);
    let second = envoy.response().await;
    assert_eq!(second.resources, first.resources);
    assert_ne!(second.version_info, first.version_info);
    assert_ne!(second.nonce, first.nonce);
}

#[tokio::test]
async fn many_proxies_see_the_same_version() {
    let plane = plane();
    plane.handler.on_change(&secure_hosts_graph(1, false));

    let mut proxies: Vec<_> = (0..10).map(|i| Envoy::ads(&plane, &format!("envoy-{i}"))).collect();
    for envoy in &proxies {
        envoy.request(TypeUrl::CLUSTER, &[], None).await;
    }
    for envoy in &mut proxies {
        let first = envoy.response().await;
        envoy.request(TypeUrl::CLUSTER, &[], Some(&first)).await;
    }

    let versions = plane.handler.on_change(&secure_hosts_graph(2, false));
    for envoy in &mut proxies {
        let update = envoy.response().await;
        assert_eq!(update.version_info, versions.clusters.to_string());
    }
    assert_eq!(plane.server.metrics().active_streams(), 10);
}

#[tokio::test]
async fn shutdown_ends_proxy_streams() {
    let plane = plane();
    plane.handler.on_change(&tcp_proxy_graph());

    let mut envoy = Envoy::ads(&plane, "envoy-0");
    envoy.request(TypeUrl::LISTENER, &[], None).await;
    let first = envoy.response().await;
    envoy.request(TypeUrl::LISTENER, &[], Some(&first)).await;

    let controller = plane.server.shutdown_controller().clone();
    let drained = tokio::spawn(async move { controller.shutdown(Duration::from_secs(1)).await });
    let status = envoy.next().await.expect_err("closed by shutdown");
    assert_eq!(status.code(), Code::Unavailable);
    assert!(drained.await.expect("shutdown task"));
}
