//! Load tests for the caches and the rebuild path.
//!
//! These cover the shapes a busy ingress sees:
//! - 1000 delivery workers waiting on one cache
//! - readers running concurrently with a writer
//! - rebuilds of a graph with hundreds of hosts
//!
//! Run with: `cargo test --package integration-tests load_tests -- --nocapture`

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ingress_xds::CacheHandler;
use tokio::sync::Barrier;
use xds_cache::{Caches, ClusterCache, Watch};
use xds_dag::{Cluster as DagCluster, Dag, Route, VirtualHost};
use xds_server::XdsMetrics;
use xds_translate::ListenerConfig;
use xds_types::cluster::Cluster;

use crate::fixtures::{ingress, secret, secure_host, service, tls_context};

fn clusters(count: usize, generation: usize) -> Vec<Cluster> {
    (0..count)
        .map(|i| Cluster {
            name: format!("default/svc-{i}/80/{generation:08x}"),
            ..Default::default()
        })
        .collect()
}

/// A graph with `hosts` plaintext and `hosts` TLS virtual hosts.
fn large_graph(hosts: usize) -> Dag {
    let tls = secret("tls");
    let mut listener = ingress();
    for i in 0..hosts {
        let svc = service(&format!("svc-{i}"), 80);
        listener = listener
            .with_virtual_host(
                VirtualHost::new(format!("app-{i}.example.com"))
                    .with_route(Route::prefix("/").with_cluster(DagCluster::new(svc.clone()))),
            )
            .with_secure_virtual_host(secure_host(&format!("secure-{i}.example.com"), &svc, &tls));
    }
    Dag::new().with_listener(listener)
}

#[tokio::test]
async fn test_1000_waiters_woken_by_one_update() {
    let cache = ClusterCache::new();
    cache.update(clusters(10, 0));
    let num_watches = 1000;

    let start = Instant::now();
    let mut watches: Vec<_> = (0..num_watches).map(|_| Watch::new()).collect();
    for watch in &watches {
        cache.register(watch.id(), watch.notifier(), cache.version());
    }
    println!("Registered {} watches in {:?}", num_watches, start.elapsed());
    assert_eq!(cache.waiting(), num_watches);

    let start = Instant::now();
    let version = cache.update(clusters(10, 1));
    println!("Notified {} watches in {:?}", num_watches, start.elapsed());

    let received = watches
        .iter_mut()
        .map(|w| w.try_recv())
        .filter(|v| *v == Some(version))
        .count();
    assert_eq!(received, num_watches);
    assert_eq!(cache.waiting(), 0);
    assert_eq!(cache.stats().notifications_sent(), num_watches as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_and_writer() {
    let cache = Arc::new(ClusterCache::new());
    cache.update(clusters(100, 0));

    let num_readers = 8;
    let ops_per_task = 1000;
    let barrier = Arc::new(Barrier::new(num_readers + 1));
    let read_count = Arc::new(AtomicU64::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();

    for _ in 0..num_readers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let read_count = Arc::clone(&read_count);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let mut last = 0;
            for _ in 0..ops_per_task {
                let snapshot = cache.snapshot();
                // Every snapshot is one whole update.
                assert_eq!(snapshot.len(), 100);
                let generations: HashSet<_> =
                    snapshot.iter().filter_map(|c| c.name.rsplit('/').next()).collect();
                assert_eq!(generations.len(), 1);
                let version = snapshot.version().as_u64();
                assert!(version >= last, "versions never go backwards");
                last = version;
                read_count.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    let writer = {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            for generation in 1..=ops_per_task {
                cache.update(clusters(100, generation));
            }
        })
    };

    for handle in handles {
        handle.await.expect("reader panicked");
    }
    writer.await.expect("writer panicked");

    let duration = start.elapsed();
    let reads = read_count.load(Ordering::Relaxed);
    println!(
        "Concurrent R/W: {} reads, {} writes in {:?}",
        reads, ops_per_task, duration
    );
    assert_eq!(reads, (num_readers * ops_per_task) as u64);
    assert_eq!(cache.version(), ops_per_task as u64 + 1);
}

#[tokio::test]
async fn test_rebuild_large_graph() {
    let caches = Caches::new();
    let handler = CacheHandler::new(ListenerConfig::default(), caches.clone(), XdsMetrics::new())
        .expect("handler");
    let hosts = 500;
    let graph = large_graph(hosts);

    let start = Instant::now();
    let versions = handler.on_change(&graph);
    let first = start.elapsed();
    let start = Instant::now();
    handler.on_change(&graph);
    println!("Rebuilt {} hosts in {:?} then {:?}", hosts * 2, first, start.elapsed());

    assert_eq!(versions.clusters, 1);
    assert_eq!(caches.clusters.len(), hosts);
    assert_eq!(caches.endpoints.len(), hosts);
    assert_eq!(caches.routes.http().len(), hosts);
    assert_eq!(caches.routes.https().len(), hosts);
    assert_eq!(caches.secrets.len(), 1);
    assert_eq!(caches.listeners.len(), 2);
}

#[tokio::test]
async fn test_rebuilds_during_waits() {
    let caches = Caches::new();
    let handler = Arc::new(
        CacheHandler::new(ListenerConfig::default(), caches.clone(), XdsMetrics::new())
            .expect("handler"),
    );
    handler.on_change(&large_graph(10));

    let num_watches = 200;
    let mut watches: Vec<_> = (0..num_watches).map(|_| Watch::new()).collect();
    for watch in &watches {
        caches.listeners.register(watch.id(), watch.notifier(), 1);
    }

    let rebuilds = {
        let handler = Arc::clone(&handler);
        tokio::task::spawn_blocking(move || {
            for hosts in 1..=20 {
                handler.on_change(&large_graph(hosts));
            }
        })
    };
    rebuilds.await.expect("rebuild task");

    for watch in &mut watches {
        assert!(watch.try_recv().is_some_and(|v| v >= 2));
    }
    assert_eq!(caches.listeners.version(), 21);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_listeners_never_name_unpublished_secrets() {
    let caches = Caches::new();
    let handler = Arc::new(
        CacheHandler::new(ListenerConfig::default(), caches.clone(), XdsMetrics::new())
            .expect("handler"),
    );
    let rounds = 200;
    let done = Arc::new(AtomicBool::new(false));

    // Round n serves hosts 0..=n, each with its own certificate, so the
    // published secrets only ever grow.
    let graph = |round: usize| {
        let svc = service("kuard", 80);
        let mut listener = ingress();
        for i in 0..=round {
            let tls = secret(&format!("tls-{i}"));
            listener = listener.with_secure_virtual_host(secure_host(&format!("host-{i}.example.com"), &svc, &tls));
        }
        Dag::new().with_listener(listener)
    };

    let observer = {
        let caches = caches.clone();
        let done = Arc::clone(&done);
        tokio::task::spawn_blocking(move || {
            let mut checks = 0u64;
            while !done.load(Ordering::Acquire) {
                let listeners = caches.listeners.snapshot();
                let secrets: HashSet<String> = caches.secrets.contents().into_iter().map(|s| s.name).collect();
                for chain in listeners.iter().flat_map(|l| l.filter_chains.iter()) {
                    let tls = tls_context(chain);
                    for name in tls.secret_names() {
                        assert!(secrets.contains(name), "listener named {name} before it was published");
                    }
                }
                checks += 1;
            }
            checks
        })
    };

    let start = Instant::now();
    let writer = {
        let handler = Arc::clone(&handler);
        tokio::task::spawn_blocking(move || {
            for round in 0..rounds {
                handler.on_change(&graph(round));
            }
        })
    };
    writer.await.expect("writer panicked");
    done.store(true, Ordering::Release);
    let checks = observer.await.expect("observer panicked");
    println!("{} rebuilds observed {} times in {:?}", rounds, checks, start.elapsed());

    assert_eq!(caches.secrets.len(), rounds);
    assert_eq!(caches.listeners.version(), rounds as u64);
}
