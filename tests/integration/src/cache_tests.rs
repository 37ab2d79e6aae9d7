//! Cache integration tests.

use std::sync::Arc;
use std::time::Duration;

use xds_cache::{Caches, ClusterCache, ResourceAdapter, ResourceRegistry, RouteCache, Watch};
use xds_core::naming::{HTTPS_ROUTE_CONFIG, HTTP_ROUTE_CONFIG};
use xds_core::TypeUrl;
use xds_types::cluster::Cluster;
use xds_types::route::{RouteConfiguration, VirtualHost};
use xds_types::unpack;

fn cluster(name: &str) -> Cluster {
    Cluster {
        name: name.to_string(),
        ..Default::default()
    }
}

fn vhost(name: &str) -> VirtualHost {
    VirtualHost {
        name: name.to_string(),
        ..Default::default()
    }
}

fn names(clusters: &[Cluster]) -> Vec<&str> {
    clusters.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn query_returns_only_requested_names() {
    let cache = ClusterCache::new();
    cache.update([cluster("y"), cluster("x")]);

    assert_eq!(names(&cache.query(&["x".to_string()])), ["x"]);
    assert!(cache.query(&["absent".to_string()]).is_empty());
    assert_eq!(
        names(&cache.query(&["y".to_string(), "absent".to_string(), "x".to_string()])),
        ["x", "y"]
    );
}

#[test]
fn snapshot_is_sorted_and_stable() {
    let cache = ClusterCache::new();
    cache.update([cluster("c"), cluster("a"), cluster("b")]);
    let snapshot = cache.snapshot();
    cache.update([cluster("z")]);

    let held: Vec<_> = snapshot.iter().map(|c| c.name.clone()).collect();
    assert_eq!(held, ["a", "b", "c"]);
    assert_eq!(snapshot.version().as_u64(), 1);
    assert_eq!(names(&cache.contents()), ["z"]);
}

#[test]
fn identical_updates_still_bump_the_version() {
    let cache = ClusterCache::new();
    assert_eq!(cache.update([cluster("a")]), 1);
    assert_eq!(cache.update([cluster("a")]), 2);
    assert_eq!(cache.stats().updates(), 2);
}

#[tokio::test]
async fn stale_registration_is_notified_without_an_update() {
    let cache = ClusterCache::new();
    cache.update([cluster("a")]);
    cache.update([cluster("b")]);

    let mut watch = Watch::new();
    cache.register(watch.id(), watch.notifier(), 1);
    let version = tokio::time::timeout(Duration::from_millis(100), watch.recv())
        .await
        .expect("notified immediately");
    assert_eq!(version, Some(2));
    assert_eq!(cache.waiting(), 0);
}

#[tokio::test]
async fn current_registration_waits_for_the_next_update() {
    let cache = Arc::new(ClusterCache::new());
    cache.update([cluster("a")]);

    let mut watch = Watch::new();
    cache.register(watch.id(), watch.notifier(), 1);
    assert!(watch.try_recv().is_none());
    assert_eq!(cache.waiting(), 1);

    let writer = cache.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.update([cluster("b")]);
    });
    let version = tokio::time::timeout(Duration::from_secs(1), watch.recv())
        .await
        .expect("notified by the update");
    assert_eq!(version, Some(2));
}

#[test]
fn inattentive_waiter_never_blocks_the_writer() {
    let cache = ClusterCache::new();
    let mut watch = Watch::new();

    for i in 0..100u64 {
        cache.register(watch.id(), watch.notifier(), i);
        cache.update([cluster("a")]);
    }
    // One buffered wake-up; the current version is read directly.
    assert!(watch.try_recv().is_some());
    assert!(watch.try_recv().is_none());
    assert_eq!(cache.version(), 100);
}

#[test]
fn dropped_waiters_are_counted() {
    let cache = ClusterCache::new();
    let watch = Watch::new();
    cache.register(watch.id(), watch.notifier(), 0);
    drop(watch);

    cache.update([cluster("a")]);
    assert_eq!(cache.stats().notifications_dropped(), 1);
    assert_eq!(cache.waiting(), 0);
}

#[test]
fn cancelled_waiters_are_not_notified() {
    let cache = ClusterCache::new();
    let mut watch = Watch::new();
    cache.register(watch.id(), watch.notifier(), 0);
    cache.cancel(watch.id());

    cache.update([cluster("a")]);
    assert!(watch.try_recv().is_none());
}

#[test]
fn adapter_packs_sorted_resources() {
    let cache = ClusterCache::new();
    cache.update([cluster("b"), cluster("a")]);
    let adapter: &dyn ResourceAdapter = &cache;

    assert_eq!(adapter.type_url(), TypeUrl::CLUSTER);
    let (version, resources) = adapter.fetch(&[]);
    assert_eq!(version, 1);
    let unpacked: Vec<Cluster> = resources
        .iter()
        .map(|any| unpack(any).expect("cluster"))
        .collect();
    assert_eq!(names(&unpacked), ["a", "b"]);

    let (_, only_b) = adapter.fetch(&["b".to_string()]);
    assert_eq!(only_b.len(), 1);
}

#[test]
fn route_adapter_synthesizes_both_configurations() {
    let routes = RouteCache::new();
    routes.update([vhost("b.example.com"), vhost("a.example.com")], []);

    let (version, resources) = routes.fetch(&[]);
    assert_eq!(version, 2);
    let configs: Vec<RouteConfiguration> = resources
        .iter()
        .map(|any| unpack(any).expect("route configuration"))
        .collect();
    let config_names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(config_names, [HTTP_ROUTE_CONFIG, HTTPS_ROUTE_CONFIG]);

    let hosts: Vec<_> = configs[0].virtual_hosts.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(hosts, ["a.example.com", "b.example.com"]);
    assert!(configs[1].virtual_hosts.is_empty());

    let (_, secure) = routes.fetch(&[HTTPS_ROUTE_CONFIG.to_string()]);
    assert_eq!(secure.len(), 1);
}

#[tokio::test]
async fn route_adapter_wakes_on_either_host_cache() {
    let routes = RouteCache::new();
    let version = routes.version();

    let mut watch = Watch::new();
    routes.register(watch.id(), watch.notifier(), version);
    routes.https().update([vhost("secure.example.com")]);
    tokio::time::timeout(Duration::from_millis(100), watch.recv())
        .await
        .expect("woken by the https cache");
    assert!(routes.version() > version);

    routes.cancel(watch.id());
    assert_eq!(routes.http().waiting(), 0);
    assert_eq!(routes.https().waiting(), 0);
}

#[test]
fn registry_serves_every_kind() {
    let caches = Caches::new();
    let registry = caches.registry();
    assert!(registry.is_complete());
    assert_eq!(registry.len(), 5);

    for type_url in TypeUrl::ALL {
        let adapter = registry.require(type_url).expect("registered");
        assert_eq!(adapter.type_url(), type_url);
    }
    assert!(registry.get("type.googleapis.com/unknown").is_none());
    assert!(registry.require("type.googleapis.com/unknown").is_err());
    assert!(!ResourceRegistry::new().is_complete());
}

#[test]
fn registry_shares_the_callers_caches() {
    let caches = Caches::new();
    let registry = caches.registry();
    caches.clusters.update([cluster("a")]);

    let (version, resources) = registry.require(TypeUrl::CLUSTER).expect("clusters").fetch(&[]);
    assert_eq!(version, 1);
    assert_eq!(resources.len(), 1);
}
