//! Server configuration.

use std::time::Duration;

/// Default limit for encoded messages in either direction.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for the delivery server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Serve the aggregated discovery service.
    pub enable_ads: bool,
    /// Maximum concurrent HTTP/2 streams per connection.
    pub max_concurrent_streams: Option<u32>,
    /// HTTP/2 keepalive ping interval.
    pub keepalive_interval: Option<Duration>,
    /// HTTP/2 keepalive ping timeout.
    pub keepalive_timeout: Option<Duration>,
    /// Largest request accepted from a proxy, in bytes.
    pub max_request_size: usize,
    /// Largest response sent to a proxy, in bytes. Larger responses are
    /// dropped and the proxy keeps its previous configuration.
    pub max_message_size: usize,
    /// Responses buffered per stream before workers wait for the proxy.
    pub response_buffer: usize,
    /// Mount the gRPC health service.
    pub enable_health: bool,
    /// Time given to open streams to close once shutdown begins.
    pub grace_period: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enable_ads: true,
            max_concurrent_streams: Some(100),
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_timeout: Some(Duration::from_secs(10)),
            max_request_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            response_buffer: 16,
            enable_health: true,
            grace_period: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert!(config.enable_ads);
        assert!(config.enable_health);
        assert_eq!(config.max_message_size, 4 * 1024 * 1024);
        assert_eq!(config.response_buffer, 16);
        assert_eq!(config.grace_period, Duration::from_secs(30));
    }
}
