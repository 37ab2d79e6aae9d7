//! # xds-server
//!
//! State-of-the-World xDS delivery over gRPC.
//!
//! - [`XdsServer`] - serves the caches of a [`ResourceRegistry`]
//! - [`XdsServerBuilder`] - builder for configuring the server
//! - [`DiscoveryServer`] - one discovery service (CDS, EDS, LDS, RDS, SDS
//!   or ADS), also usable without a transport
//! - Health checking via the gRPC health protocol
//! - Metrics through the `metrics` facade
//! - Graceful shutdown that closes streams before the process exits
//!
//! ## Delivery model
//!
//! Each stream has one worker per resource type. A worker answers every
//! request with exactly one response, sent as soon as its cache holds a
//! version newer than the one it last sent. Versions are per type, so a
//! proxy never sees a type go backwards, while types progress
//! independently of each other.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xds_cache::Caches;
//! use xds_server::XdsServerBuilder;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let caches = Caches::new();
//! let server = XdsServerBuilder::new()
//!     .registry(Arc::new(caches.registry()))
//!     .max_concurrent_streams(200)
//!     .build()?;
//!
//! // Serves until SIGTERM or SIGINT, then drains open streams.
//! server.serve("[::]:8001".parse()?).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

mod builder;
mod config;
pub mod health;
pub mod metrics;
pub mod services;
pub mod shutdown;
mod sotw;
mod stream;
mod streaming;
mod utils;


pub use builder::XdsServerBuilder;
pub use config::{ServerConfig, DEFAULT_MAX_MESSAGE_SIZE};
pub use health::HealthService;
pub use metrics::XdsMetrics;
pub use services::{
    AdsServer, CdsServer, DiscoveryKind, DiscoveryServer, DiscoveryServices, EdsServer,
    LdsServer, RdsServer, ResponseStream, SdsServer,
};
pub use shutdown::{ShutdownController, ShutdownSignal};
pub use stream::{StreamContext, StreamId};
pub use utils::generate_nonce;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::server::Router;
use tonic::transport::Server;
use tracing::info;
use xds_cache::ResourceRegistry;
use xds_core::{XdsError, XdsResult};

use crate::streaming::StreamEnv;

/// The delivery server.
#[derive(Debug, Clone)]
pub struct XdsServer {
    registry: Arc<ResourceRegistry>,
    config: Arc<ServerConfig>,
    metrics: XdsMetrics,
    shutdown: ShutdownController,
}

impl XdsServer {
    pub fn builder() -> XdsServerBuilder {
        XdsServerBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[inline]
    pub fn metrics(&self) -> &XdsMetrics {
        &self.metrics
    }

    #[inline]
    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// The discovery services, sharing this server's caches and shutdown.
    pub fn services(&self) -> DiscoveryServices {
        DiscoveryServices::new(StreamEnv {
            registry: Arc::clone(&self.registry),
            config: Arc::clone(&self.config),
            metrics: self.metrics.clone(),
            shutdown: self.shutdown.clone(),
        })
    }

    fn router(&self) -> (Router, Option<HealthService>) {
        let services = self.services();

        let mut builder = Server::builder()
            .http2_keepalive_interval(self.config.keepalive_interval)
            .http2_keepalive_timeout(self.config.keepalive_timeout)
            .max_concurrent_streams(self.config.max_concurrent_streams);

        let mut router = builder
            .add_service(services.cds)
            .add_service(services.eds)
            .add_service(services.lds)
            .add_service(services.rds)
            .add_service(services.sds);
        if self.config.enable_ads {
            router = router.add_service(services.ads);
        }

        let health = if self.config.enable_health {
            let (health, health_server) = HealthService::new(self.config.enable_ads);
            router = router.add_service(health_server);
            Some(health)
        } else {
            None
        };

        (router, health)
    }

    /// Serve on `addr` until SIGTERM or SIGINT.
    pub async fn serve(self, addr: SocketAddr) -> XdsResult<()> {
        self.serve_with_shutdown(addr, shutdown::wait_for_signal())
            .await
    }

    /// Serve on `addr` until `signal` completes.
    ///
    /// When it does, the health service reports NOT_SERVING, open streams
    /// are closed with `UNAVAILABLE`, and the server waits up to the grace
    /// period for them to finish.
    pub async fn serve_with_shutdown<F>(self, addr: SocketAddr, signal: F) -> XdsResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let (router, health) = self.router();
        if let Some(health) = &health {
            health.set_all_serving().await;
        }

        let controller = self.shutdown.clone();
        let grace_period = self.config.grace_period;
        let drain = async move {
            signal.await;
            if let Some(health) = &health {
                health.set_all_not_serving().await;
            }
            info!(grace_period = ?grace_period, "draining discovery streams");
            controller.shutdown(grace_period).await;
        };

        info!(
            addr = %addr,
            types = self.registry.len(),
            ads = self.config.enable_ads,
            "xDS server listening"
        );
        router
            .serve_with_shutdown(addr, drain)
            .await
            .map_err(|e| XdsError::transport("serving discovery services", e))?;
        info!("xDS server stopped");
        Ok(())
    }
}
