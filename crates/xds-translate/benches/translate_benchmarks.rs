//! Benchmarks for graph translation.
//!
//! Run with: `cargo bench --package xds-translate`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xds_dag::{Cluster, Dag, Listener, Route, SecureVirtualHost, Secret, Service, VirtualHost};
use xds_translate::{clusters, listeners, routes, ListenerConfig, Translator};

/// `hosts` plaintext hosts and `hosts` TLS hosts, each with three routes.
fn graph(hosts: usize) -> Dag {
    let tls = Arc::new(Secret::new("default", "tls", "CERT", "KEY"));
    let mut listener = Listener::new("ingress", 80);
    for i in 0..hosts {
        let svc = Arc::new(
            Service::new("default", format!("svc-{i}"), 80)
                .with_endpoints([format!("10.0.{}.{}:8080", i / 250, i % 250 + 1).parse().expect("addr")]),
        );
        let routes = || {
            ["/", "/api", "/static/"]
                .into_iter()
                .map(|p| Route::prefix(p).with_cluster(Cluster::new(svc.clone())))
        };
        let mut plain = VirtualHost::new(format!("app-{i}.example.com"));
        let mut secure = SecureVirtualHost::new(format!("secure-{i}.example.com")).with_secret(tls.clone());
        for route in routes() {
            plain = plain.with_route(route.clone());
            secure = secure.with_route(route);
        }
        listener = listener.with_virtual_host(plain).with_secure_virtual_host(secure);
    }
    Dag::new().with_listener(listener)
}

fn bench_translate(c: &mut Criterion) {
    let translator = Translator::new(ListenerConfig::default()).expect("default config");
    let mut group = c.benchmark_group("translate");

    for hosts in [10, 100, 1000] {
        let dag = graph(hosts);
        group.throughput(Throughput::Elements(hosts as u64 * 2));
        group.bench_with_input(BenchmarkId::new("all_kinds", hosts), &dag, |b, dag| {
            b.iter(|| translator.translate(black_box(dag)));
        });
    }

    group.finish();
}

fn bench_visitors(c: &mut Criterion) {
    let config = ListenerConfig::default();
    let dag = graph(500);
    let mut group = c.benchmark_group("visitors");

    group.bench_function("clusters", |b| {
        b.iter(|| clusters(black_box(&dag), &config.xds_cluster));
    });
    group.bench_function("listeners", |b| {
        b.iter(|| listeners(black_box(&dag), &config));
    });
    group.bench_function("routes", |b| {
        b.iter(|| routes(black_box(&dag)));
    });

    group.finish();
}

criterion_group!(benches, bench_translate, bench_visitors);
criterion_main!(benches);
