//! Metrics for the delivery server.
//!
//! Recorded through the `metrics` facade; the binary decides which
//! exporter, if any, is installed.
//!
//! - request, response, ACK and NACK counters per type URL
//! - responses dropped because they exceeded the message size limit
//! - open/closed streams per service and stream duration
//! - cache version and resource count per type URL, set on every rebuild
//!
//! # Example
//!
//! ```rust
//! use xds_server::XdsMetrics;
//!
//! let metrics = XdsMetrics::new();
//! metrics.record_request("type.googleapis.com/envoy.config.cluster.v3.Cluster");
//! metrics.record_response("type.googleapis.com/envoy.config.cluster.v3.Cluster", 3, 512);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// Metrics for the delivery server.
#[derive(Debug, Clone)]
pub struct XdsMetrics {
    inner: Arc<XdsMetricsInner>,
}

#[derive(Debug)]
struct XdsMetricsInner {
    active_streams: AtomicU64,
}

impl Default for XdsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl XdsMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(XdsMetricsInner {
                active_streams: AtomicU64::new(0),
            }),
        }
    }

    /// Record an incoming discovery request.
    pub fn record_request(&self, type_url: &str) {
        counter!("xds_requests_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a response sent, with its resource count and encoded size.
    pub fn record_response(&self, type_url: &str, resources: usize, bytes: usize) {
        counter!("xds_responses_total", "type_url" => type_url.to_string()).increment(1);
        histogram!("xds_response_resources", "type_url" => type_url.to_string())
            .record(resources as f64);
        histogram!("xds_response_bytes", "type_url" => type_url.to_string()).record(bytes as f64);
    }

    pub fn record_ack(&self, type_url: &str) {
        counter!("xds_acks_total", "type_url" => type_url.to_string()).increment(1);
    }

    pub fn record_nack(&self, type_url: &str) {
        counter!("xds_nacks_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a response dropped because it could not be encoded.
    pub fn record_encoding_error(&self, type_url: &str) {
        counter!("xds_encoding_errors_total", "type_url" => type_url.to_string()).increment(1);
    }

    pub fn stream_opened(&self, service: &str) {
        let count = self.inner.active_streams.fetch_add(1, Ordering::Relaxed) + 1;
        counter!("xds_streams_opened_total", "service" => service.to_string()).increment(1);
        gauge!("xds_active_streams").set(count as f64);
    }

    pub fn stream_closed(&self, service: &str, duration: Duration) {
        let count = self
            .inner
            .active_streams
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1);
        counter!("xds_streams_closed_total", "service" => service.to_string()).increment(1);
        gauge!("xds_active_streams").set(count as f64);
        histogram!("xds_stream_duration_seconds", "service" => service.to_string())
            .record(duration.as_secs_f64());
    }

    /// Record the state of one cache after a rebuild.
    pub fn cache_updated(&self, type_url: &str, version: u64, resources: usize) {
        counter!("xds_cache_updates_total", "type_url" => type_url.to_string()).increment(1);
        gauge!("xds_cache_version", "type_url" => type_url.to_string()).set(version as f64);
        gauge!("xds_cache_resources", "type_url" => type_url.to_string()).set(resources as f64);
    }

    /// Current number of open streams.
    pub fn active_streams(&self) -> u64 {
        self.inner.active_streams.load(Ordering::Relaxed)
    }
}

/// Stream duration tracker.
///
/// Counts the stream as open until dropped.
#[derive(Debug)]
pub struct StreamTracker {
    start: Instant,
    service: &'static str,
    metrics: XdsMetrics,
}

impl StreamTracker {
    pub fn new(metrics: XdsMetrics, service: &'static str) -> Self {
        metrics.stream_opened(service);
        Self {
            start: Instant::now(),
            service,
            metrics,
        }
    }
}

impl Drop for StreamTracker {
    fn drop(&mut self) {
        self.metrics.stream_closed(self.service, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_creation() {
        let metrics = XdsMetrics::new();
        assert_eq!(metrics.active_streams(), 0);
    }

    #[test]
    fn stream_tracking() {
        let metrics = XdsMetrics::new();

        metrics.stream_opened("ADS");
        assert_eq!(metrics.active_streams(), 1);

        metrics.stream_opened("CDS");
        assert_eq!(metrics.active_streams(), 2);

        metrics.stream_closed("ADS", Duration::from_secs(10));
        assert_eq!(metrics.active_streams(), 1);
    }

    #[test]
    fn tracker_closes_on_drop() {
        let metrics = XdsMetrics::new();
        {
            let _tracker = StreamTracker::new(metrics.clone(), "LDS");
            assert_eq!(metrics.active_streams(), 1);
        }
        assert_eq!(metrics.active_streams(), 0);
    }

    #[test]
    fn recording_without_recorder_is_harmless() {
        let metrics = XdsMetrics::new();
        metrics.record_request("t");
        metrics.record_response("t", 0, 0);
        metrics.record_ack("t");
        metrics.record_nack("t");
        metrics.record_encoding_error("t");
        metrics.cache_updated("t", 1, 0);
    }
}
