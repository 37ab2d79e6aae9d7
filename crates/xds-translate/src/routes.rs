//! Route configuration translation.

use std::collections::BTreeMap;

use tracing::warn;
use xds_core::naming::{HTTPS_ROUTE_CONFIG, HTTP_ROUTE_CONFIG};
use xds_dag::{self as dag, Dag, Vertex};
use xds_types::route::{Route, RouteConfiguration, VirtualHost};

use crate::envoy::route::{compare_routes, forward, https_redirect, virtual_host};
use crate::{for_each_host, serving_secret};

/// Always exactly two route configurations: one for plaintext hosts, one
/// for TLS hosts. Virtual hosts are ordered by name.
pub fn routes(dag: &Dag) -> BTreeMap<String, RouteConfiguration> {
    let mut http: BTreeMap<&str, VirtualHost> = BTreeMap::new();
    let mut https: BTreeMap<&str, VirtualHost> = BTreeMap::new();

    for_each_host(dag, |vertex| match vertex {
        Vertex::VirtualHost(vh) => add(&mut http, &vh.name, insecure_routes(vh)),
        Vertex::SecureVirtualHost(svh) => {
            if svh.tcp_proxy.is_none() && serving_secret(svh).is_some() {
                add(&mut https, svh.name(), secure_routes(&svh.virtual_host));
            }
        }
        _ => {}
    });

    [(HTTP_ROUTE_CONFIG, http), (HTTPS_ROUTE_CONFIG, https)]
        .into_iter()
        .map(|(name, vhosts)| {
            (
                name.to_string(),
                RouteConfiguration {
                    name: name.to_string(),
                    virtual_hosts: vhosts.into_values().collect(),
                },
            )
        })
        .collect()
}

fn add<'a>(vhosts: &mut BTreeMap<&'a str, VirtualHost>, name: &'a str, routes: Vec<Route>) {
    if routes.is_empty() {
        return;
    }
    if vhosts.contains_key(name) {
        warn!(vhost = %name, "duplicate virtual host, keeping the first");
        return;
    }
    vhosts.insert(name, virtual_host(name, routes));
}

fn sorted(routes: &[dag::Route]) -> Vec<&dag::Route> {
    let mut out: Vec<_> = routes.iter().collect();
    out.sort_by(|a, b| compare_routes(a, b));
    out
}

fn insecure_routes(vh: &dag::VirtualHost) -> Vec<Route> {
    let stat_prefix = format!("vhost.{}", vh.name);
    sorted(&vh.routes)
        .into_iter()
        .filter_map(|r| {
            if r.https_upgrade {
                Some(https_redirect(r))
            } else {
                forward(r, &stat_prefix)
            }
        })
        .collect()
}

fn secure_routes(vh: &dag::VirtualHost) -> Vec<Route> {
    let stat_prefix = format!("vhost.{}", vh.name);
    sorted(&vh.routes)
        .into_iter()
        .filter_map(|r| forward(r, &stat_prefix))
        .collect()
}
