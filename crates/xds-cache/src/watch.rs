//! Waiter registration for cache update notifications.
//!
//! A delivery worker owns one [`Watch`] for its lifetime and registers it
//! with a cache whenever it is ready for the next version. The cache keeps
//! the registration in its [`Waiters`] until the next update, then sends the
//! new version and forgets it: every registration is notified at most once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::trace;

/// Unique identifier for a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl WatchId {
    /// Allocate a new process-unique id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value of this watch ID.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Sending half handed to caches on registration; carries the version the
/// cache advanced to.
pub type Notifier = mpsc::Sender<u64>;

/// A worker's subscription handle.
///
/// The channel holds a single pending notification. A second update that
/// lands before the worker wakes is not queued: the worker reads the cache's
/// current version when it does wake, so nothing is lost.
#[derive(Debug)]
pub struct Watch {
    id: WatchId,
    sender: Notifier,
    receiver: mpsc::Receiver<u64>,
}

impl Default for Watch {
    fn default() -> Self {
        Self::new()
    }
}

impl Watch {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(1);
        Self {
            id: WatchId::next(),
            sender,
            receiver,
        }
    }

    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// A notifier for registering this watch with a cache.
    pub fn notifier(&self) -> Notifier {
        self.sender.clone()
    }

    /// Wait for the next notification.
    ///
    /// Never returns `None` while the watch is alive, since it holds a
    /// sender itself.
    pub async fn recv(&mut self) -> Option<u64> {
        self.receiver.recv().await
    }

    /// Take a pending notification without waiting.
    pub fn try_recv(&mut self) -> Option<u64> {
        self.receiver.try_recv().ok()
    }

    /// Discard any pending notification.
    pub fn clear(&mut self) {
        while self.receiver.try_recv().is_ok() {}
    }
}

/// Outcome of notifying a set of waiters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Notified {
    /// Waiters that received the version or already had one pending.
    pub delivered: u64,
    /// Waiters whose watch had gone away.
    pub dropped: u64,
}

/// Registered waiters of one cache.
#[derive(Debug, Default)]
pub struct Waiters {
    waiters: HashMap<WatchId, Notifier>,
}

impl Waiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`, replacing any earlier registration of the same watch.
    pub fn insert(&mut self, id: WatchId, notifier: Notifier) {
        self.waiters.insert(id, notifier);
    }

    /// Returns whether `id` was registered.
    pub fn remove(&mut self, id: WatchId) -> bool {
        self.waiters.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    /// Send `version` to every waiter and clear the set.
    ///
    /// Never blocks: a full channel already holds a wake-up, a closed one
    /// belongs to a stream that has gone.
    pub fn notify_all(&mut self, version: u64) -> Notified {
        let mut out = Notified::default();
        for (id, notifier) in self.waiters.drain() {
            match notifier.try_send(version) {
                Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => out.delivered += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    trace!(watch_id = %id, "waiter gone");
                    out.dropped += 1;
                }
            }
        }
        out
    }
}

/// Notify a single registration immediately.
pub(crate) fn notify_one(notifier: &Notifier, version: u64) -> Notified {
    match notifier.try_send(version) {
        Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => Notified {
            delivered: 1,
            dropped: 0,
        },
        Err(mpsc::error::TrySendError::Closed(_)) => Notified {
            delivered: 0,
            dropped: 1,
        },
    }
}
