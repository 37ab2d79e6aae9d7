//! Stream context and identification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use xds_core::NodeHash;
use xds_types::base::Node;

/// Unique identifier for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

impl StreamId {
    /// Generate a new unique stream ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Context for an active discovery stream.
///
/// Created once the first request has identified the proxy, then shared by
/// the stream reader and every delivery worker of the stream.
#[derive(Debug)]
pub struct StreamContext {
    id: StreamId,
    service: &'static str,
    node_id: String,
    node_cluster: String,
    node_hash: NodeHash,
    created_at: Instant,
    requests: AtomicU64,
    responses: AtomicU64,
    last_request: Mutex<Instant>,
}

impl StreamContext {
    /// Create the context for a stream opened by `node`.
    pub fn new(service: &'static str, node: &Node) -> Self {
        let now = Instant::now();
        Self {
            id: StreamId::new(),
            service,
            node_id: node.id.clone(),
            node_cluster: node.cluster.clone(),
            node_hash: NodeHash::from_node(&node.id, &node.cluster),
            created_at: now,
            requests: AtomicU64::new(0),
            responses: AtomicU64::new(0),
            last_request: Mutex::new(now),
        }
    }

    #[inline]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Short name of the discovery service, e.g. `CDS` or `ADS`.
    #[inline]
    pub fn service(&self) -> &'static str {
        self.service
    }

    #[inline]
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    #[inline]
    pub fn node_cluster(&self) -> &str {
        &self.node_cluster
    }

    #[inline]
    pub fn node_hash(&self) -> NodeHash {
        self.node_hash
    }

    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time since the stream opened.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock() = Instant::now();
    }

    pub fn record_response(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn response_count(&self) -> u64 {
        self.responses.load(Ordering::Relaxed)
    }

    /// Time since the last request.
    pub fn idle_time(&self) -> Duration {
        self.last_request.lock().elapsed()
    }
}
