//! Cluster load assignments.

use std::net::SocketAddr;

use xds_types::base::Address;
use xds_types::endpoint::{ClusterLoadAssignment, LbEndpoint, LocalityLbEndpoints};

/// Load assignment for `name` over `endpoints`, sorted and deduplicated.
pub fn load_assignment(name: &str, endpoints: &[SocketAddr]) -> ClusterLoadAssignment {
    let mut addrs = endpoints.to_vec();
    addrs.sort_unstable();
    addrs.dedup();

    let lb_endpoints: Vec<_> = addrs
        .iter()
        .map(|addr| LbEndpoint::new(Address::tcp(addr.ip().to_string(), addr.port())))
        .collect();

    ClusterLoadAssignment {
        cluster_name: name.to_string(),
        endpoints: if lb_endpoints.is_empty() {
            Vec::new()
        } else {
            vec![LocalityLbEndpoints {
                lb_endpoints,
                ..Default::default()
            }]
        },
    }
}

/// Inline assignment resolving `host` through DNS.
pub fn dns_load_assignment(name: &str, host: &str, port: u16) -> ClusterLoadAssignment {
    ClusterLoadAssignment {
        cluster_name: name.to_string(),
        endpoints: vec![LocalityLbEndpoints {
            lb_endpoints: vec![LbEndpoint::new(Address::tcp(host, port))],
            ..Default::default()
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(cla: &ClusterLoadAssignment) -> Vec<(String, u32)> {
        cla.endpoints
            .iter()
            .flat_map(|l| l.lb_endpoints.iter())
            .filter_map(|e| e.address().and_then(|a| a.socket_address()))
            .map(|sa| (sa.address.clone(), sa.port().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn endpoints_are_sorted_and_unique() {
        let eps: Vec<SocketAddr> = ["10.0.0.2:80", "10.0.0.1:80", "10.0.0.2:80"]
            .iter()
            .map(|s| s.parse().expect("socket address"))
            .collect();
        let cla = load_assignment("default/kuard", &eps);
        assert_eq!(cla.cluster_name, "default/kuard");
        assert_eq!(
            ports(&cla),
            vec![("10.0.0.1".to_string(), 80), ("10.0.0.2".to_string(), 80)]
        );
    }

    #[test]
    fn no_endpoints_no_localities() {
        assert!(load_assignment("default/empty", &[]).endpoints.is_empty());
    }
}
