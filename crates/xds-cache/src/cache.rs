//! The versioned per-kind resource cache.
//!
//! One [`ResourceCache`] per resource kind lives for the whole process. The
//! rebuild pipeline is its only writer; every delivery worker reads it and
//! registers with it. A single lock guards contents, version and waiters
//! together, so a registration either sees an update's new version or is
//! notified by that update, never neither.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};
use xds_core::Resource;

use crate::snapshot::Snapshot;
use crate::stats::CacheStats;
use crate::watch::{notify_one, Notifier, WatchId, Waiters};

#[derive(Debug)]
struct Inner<T> {
    contents: Arc<BTreeMap<String, T>>,
    version: u64,
    waiters: Waiters,
}

/// Latest resources of one kind, their version and the workers waiting for
/// the next version.
#[derive(Debug)]
pub struct ResourceCache<T> {
    inner: Mutex<Inner<T>>,
    stats: CacheStats,
}

impl<T: Resource> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> ResourceCache<T> {
    /// An empty cache at version 0.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                contents: Arc::new(BTreeMap::new()),
                version: 0,
                waiters: Waiters::new(),
            }),
            stats: CacheStats::new(),
        }
    }

    /// Replace the contents, bump the version and wake every waiter.
    ///
    /// Resources are keyed by [`Resource::name`]; of two with the same name
    /// the later wins. The version is bumped even when nothing changed.
    /// Returns the new version.
    pub fn update(&self, resources: impl IntoIterator<Item = T>) -> u64 {
        let contents: BTreeMap<String, T> = resources
            .into_iter()
            .map(|r| (r.name().to_string(), r))
            .collect();
        self.replace(contents)
    }

    /// [`Self::update`] with an already keyed map.
    pub fn replace(&self, contents: BTreeMap<String, T>) -> u64 {
        let count = contents.len();
        let contents = Arc::new(contents);
        let (version, notified) = {
            let mut inner = self.inner.lock();
            inner.contents = contents;
            inner.version += 1;
            let version = inner.version;
            (version, inner.waiters.notify_all(version))
        };
        self.stats.record_update();
        self.stats.record_notified(notified);
        debug!(
            type_url = T::TYPE_URL,
            version,
            count,
            notified = notified.delivered,
            "cache updated"
        );
        version
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// The current contents and their version, read together.
    pub fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.lock();
        self.stats.record_snapshot();
        Snapshot::new(inner.version, Arc::clone(&inner.contents))
    }

    /// Every resource, in name order.
    pub fn contents(&self) -> Vec<T> {
        self.snapshot().to_vec()
    }

    /// Resources named in `names`, in name order; unknown names are
    /// omitted.
    pub fn query(&self, names: &[String]) -> Vec<T> {
        self.stats.record_query();
        if names.is_empty() {
            return Vec::new();
        }
        self.snapshot().select(names).into_iter().cloned().collect()
    }

    /// Ask to be notified once the version passes `last`.
    ///
    /// Notifies immediately when it already has.
    pub fn register(&self, id: WatchId, notifier: Notifier, last: u64) {
        self.stats.record_registration();
        let mut inner = self.inner.lock();
        if inner.version > last {
            let version = inner.version;
            drop(inner);
            trace!(type_url = T::TYPE_URL, watch_id = %id, version, last, "already stale, notifying");
            self.stats.record_notified(notify_one(&notifier, version));
            return;
        }
        inner.waiters.insert(id, notifier);
    }

    /// Forget `id`'s registration, if any.
    pub fn cancel(&self, id: WatchId) {
        self.inner.lock().waiters.remove(id);
    }

    /// Number of registered waiters.
    pub fn waiting(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
