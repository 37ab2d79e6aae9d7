//! Server builder for configuring and creating the delivery server.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use xds_cache::ResourceRegistry;
use xds_core::{XdsError, XdsResult};

use crate::config::ServerConfig;
use crate::metrics::XdsMetrics;
use crate::shutdown::ShutdownController;
use crate::XdsServer;

/// Builder for creating an [`XdsServer`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use xds_cache::ResourceRegistry;
/// use xds_server::XdsServerBuilder;
///
/// let server = XdsServerBuilder::new()
///     .registry(Arc::new(ResourceRegistry::with_default_caches()))
///     .max_concurrent_streams(200)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(server.config().max_concurrent_streams, Some(200));
/// ```
#[derive(Debug, Default)]
pub struct XdsServerBuilder {
    registry: Option<Arc<ResourceRegistry>>,
    config: ServerConfig,
    metrics: Option<XdsMetrics>,
    shutdown: Option<ShutdownController>,
}

impl XdsServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the caches to serve. Required.
    pub fn registry(mut self, registry: Arc<ResourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Do not serve the aggregated discovery service.
    pub fn disable_ads(mut self) -> Self {
        self.config.enable_ads = false;
        self
    }

    pub fn max_concurrent_streams(mut self, max: u32) -> Self {
        self.config.max_concurrent_streams = Some(max);
        self
    }

    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.config.keepalive_interval = Some(interval);
        self
    }

    pub fn keepalive_timeout(mut self, timeout: Duration) -> Self {
        self.config.keepalive_timeout = Some(timeout);
        self
    }

    /// Largest request accepted, in bytes.
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.max_request_size = size;
        self
    }

    /// Largest response sent, in bytes.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Responses buffered per stream.
    pub fn response_buffer(mut self, size: usize) -> Self {
        self.config.response_buffer = size;
        self
    }

    /// Do not mount the gRPC health service.
    pub fn disable_health(mut self) -> Self {
        self.config.enable_health = false;
        self
    }

    pub fn grace_period(mut self, grace_period: Duration) -> Self {
        self.config.grace_period = grace_period;
        self
    }

    /// Share a metrics handle with other components.
    pub fn metrics(mut self, metrics: XdsMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Share a shutdown controller with other components.
    pub fn shutdown_controller(mut self, controller: ShutdownController) -> Self {
        self.shutdown = Some(controller);
        self
    }

    /// Build the server.
    ///
    /// # Errors
    ///
    /// Returns [`XdsError::Configuration`] if no registry was provided, the
    /// registry is empty, or a size limit is zero.
    pub fn build(self) -> XdsResult<XdsServer> {
        let registry = self
            .registry
            .ok_or_else(|| XdsError::Configuration("resource registry is required".into()))?;

        if registry.is_empty() {
            return Err(XdsError::Configuration(
                "resource registry serves no types".into(),
            ));
        }
        if !registry.is_complete() {
            warn!(
                types = ?registry.type_urls().collect::<Vec<_>>(),
                "resource registry does not serve every resource type"
            );
        }
        if self.config.max_message_size == 0 || self.config.max_request_size == 0 {
            return Err(XdsError::Configuration(
                "message size limits must be positive".into(),
            ));
        }
        if self.config.response_buffer == 0 {
            return Err(XdsError::Configuration(
                "response buffer must hold at least one response".into(),
            ));
        }

        Ok(XdsServer {
            registry,
            config: Arc::new(self.config),
            metrics: self.metrics.unwrap_or_default(),
            shutdown: self.shutdown.unwrap_or_default(),
        })
    }
}
