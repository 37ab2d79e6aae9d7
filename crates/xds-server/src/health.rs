//! gRPC health checking (`grpc.health.v1.Health`) via `tonic-health`.
//!
//! Every discovery service is reported under its gRPC service name, plus
//! the empty name for the server as a whole. [`crate::XdsServer::serve`]
//! marks them serving at start and not serving when shutdown begins, so
//! load balancers stop sending new proxies before streams are closed.

use tonic_health::pb::health_server::{Health, HealthServer};
use tonic_health::server::HealthReporter;
use tonic_health::ServingStatus;

use crate::services::{
    Aggregated, Clusters, DiscoveryKind, Endpoints, Listeners, Routes, Secrets,
};

/// Handle for updating the health status of the discovery services.
#[derive(Clone)]
pub struct HealthService {
    reporter: HealthReporter,
    services: Vec<&'static str>,
}

impl std::fmt::Debug for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthService")
            .field("services", &self.services)
            .finish()
    }
}

impl HealthService {
    /// Create the status handle and the tonic service to mount.
    ///
    /// `ads` controls whether the aggregated service is reported.
    pub fn new(ads: bool) -> (Self, HealthServer<impl Health>) {
        let (reporter, server) = tonic_health::server::health_reporter();
        let mut services = vec![
            "",
            Clusters::SERVICE,
            Endpoints::SERVICE,
            Listeners::SERVICE,
            Routes::SERVICE,
            Secrets::SERVICE,
        ];
        if ads {
            services.push(Aggregated::SERVICE);
        }
        (Self { reporter, services }, server)
    }

    /// Names reported by this handle; the empty name is the whole server.
    pub fn services(&self) -> &[&'static str] {
        &self.services
    }

    pub async fn set_all_serving(&self) {
        self.set_all(ServingStatus::Serving).await;
    }

    pub async fn set_all_not_serving(&self) {
        self.set_all(ServingStatus::NotServing).await;
    }

    async fn set_all(&self, status: ServingStatus) {
        let mut reporter = self.reporter.clone();
        for service in &self.services {
            reporter.set_service_status(*service, status).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_discovery_service() {
        let (health, _server) = HealthService::new(true);
        assert!(health.services().contains(&""));
        assert!(health.services().contains(&Clusters::SERVICE));
        assert!(health.services().contains(&Aggregated::SERVICE));
        assert_eq!(health.services().len(), 7);
    }

    #[test]
    fn ads_omitted_when_disabled() {
        let (health, _server) = HealthService::new(false);
        assert!(!health.services().contains(&Aggregated::SERVICE));
    }

    #[tokio::test]
    async fn status_transitions() {
        let (health, _server) = HealthService::new(true);
        health.set_all_serving().await;
        health.set_all_not_serving().await;
    }
}
