//! Secret translation.

use std::collections::BTreeMap;

use xds_dag::{Dag, Vertex};
use xds_types::tls::Secret;

use crate::envoy::secret::secret;
use crate::names::secret_name;
use crate::{fallback_secret, for_each_host, serving_secret};

/// Every serving certificate the TLS listener references over SDS.
pub fn secrets(dag: &Dag) -> BTreeMap<String, Secret> {
    let mut out = BTreeMap::new();
    for_each_host(dag, |vertex| {
        if let Vertex::SecureVirtualHost(svh) = vertex {
            if let Some(s) = serving_secret(svh) {
                out.entry(secret_name(s)).or_insert_with(|| secret(s));
            }
        }
    });
    if let Some(s) = fallback_secret(dag) {
        out.entry(secret_name(s)).or_insert_with(|| secret(s));
    }
    out
}
