//! Cluster translation.

use std::collections::BTreeMap;

use xds_dag::{Dag, Vertex};
use xds_types::cluster::Cluster;

use crate::envoy::cluster::cluster;
use crate::names::cluster_name;

/// One cluster per distinct name reachable from any route or TCP proxy.
pub fn clusters(dag: &Dag, xds_cluster: &str) -> BTreeMap<String, Cluster> {
    let mut out = BTreeMap::new();
    dag.walk(&mut |vertex| {
        if let Vertex::Cluster(c) = vertex {
            out.entry(cluster_name(c)).or_insert_with(|| cluster(c, xds_cluster));
        }
    });
    out
}
