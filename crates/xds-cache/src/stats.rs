//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::watch::Notified;

/// Counters for one cache.
///
/// All counters are atomic and can be safely accessed from multiple threads.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of content replacements.
    updates: AtomicU64,
    /// Number of full snapshot reads.
    snapshots: AtomicU64,
    /// Number of name-filtered queries.
    queries: AtomicU64,
    /// Number of waiter registrations.
    registrations: AtomicU64,
    /// Number of notifications handed to live waiters.
    notifications_sent: AtomicU64,
    /// Number of notifications whose waiter had disconnected.
    notifications_dropped: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_notified(&self, notified: Notified) {
        self.notifications_sent
            .fetch_add(notified.delivered, Ordering::Relaxed);
        self.notifications_dropped
            .fetch_add(notified.dropped, Ordering::Relaxed);
    }

    #[inline]
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn snapshots(&self) -> u64 {
        self.snapshots.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn registrations(&self) -> u64 {
        self.registrations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn notifications_dropped(&self) -> u64 {
        self.notifications_dropped.load(Ordering::Relaxed)
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        self.updates.store(0, Ordering::Relaxed);
        self.snapshots.store(0, Ordering::Relaxed);
        self.queries.store(0, Ordering::Relaxed);
        self.registrations.store(0, Ordering::Relaxed);
        self.notifications_sent.store(0, Ordering::Relaxed);
        self.notifications_dropped.store(0, Ordering::Relaxed);
    }
}
