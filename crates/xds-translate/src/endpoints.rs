//! Endpoint translation.

use std::collections::BTreeMap;

use xds_dag::{Dag, Vertex};
use xds_types::endpoint::ClusterLoadAssignment;

use crate::envoy::endpoint::load_assignment;
use crate::names::eds_service_name;

/// One load assignment per EDS service name. Backends resolved through DNS
/// carry their assignment inline in the cluster and get none here.
pub fn endpoints(dag: &Dag) -> BTreeMap<String, ClusterLoadAssignment> {
    let mut out = BTreeMap::new();
    dag.walk(&mut |vertex| {
        if let Vertex::Service(svc) = vertex {
            if svc.external_name.is_some() {
                return;
            }
            let name = eds_service_name(svc);
            if !out.contains_key(&name) {
                let cla = load_assignment(&name, &svc.endpoints);
                out.insert(name, cla);
            }
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use xds_dag::{Cluster, Listener, Route, Service, VirtualHost};

    #[test]
    fn one_assignment_per_service_port() {
        let http = Service::new("default", "kuard", 80)
            .with_port_name("http")
            .with_endpoints(["10.0.0.1:80".parse().expect("addr")]);
        let ext = Service::new("default", "ext", 443).with_external_name("example.org");
        let dag = Dag::new().with_listener(
            Listener::new("ingress_http", 8080).with_virtual_host(
                VirtualHost::new("*")
                    .with_route(Route::prefix("/").with_cluster(Cluster::new(Arc::new(http))))
                    .with_route(Route::prefix("/ext").with_cluster(Cluster::new(Arc::new(ext)))),
            ),
        );

        let out = endpoints(&dag);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["default/kuard/http"]);
        assert_eq!(out["default/kuard/http"].endpoints[0].lb_endpoints.len(), 1);
    }
}
