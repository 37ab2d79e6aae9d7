//! # xds-cache
//!
//! Versioned per-kind resource caches for the delivery server.
//!
//! - [`ResourceCache`] - latest resources of one kind, a version counter and
//!   the workers waiting for the next version
//! - [`RouteCache`] - the route kind, assembled from two virtual host caches
//! - [`ResourceAdapter`] - what the delivery loop sees of a kind
//! - [`ResourceRegistry`] - adapters keyed by type URL
//! - [`Watch`] - a worker's registration handle
//!
//! ## Key Design Decisions
//!
//! - One lock guards contents, version and waiters, so registering never
//!   misses a concurrent update
//! - Contents are replaced wholesale behind an `Arc`; a [`Snapshot`] stays
//!   valid and unchanged after later updates
//! - Notification uses `try_send` and never blocks the writer
//! - Every update bumps the version, even when nothing changed
//!
//! ## Example
//!
//! ```rust
//! use xds_cache::{ClusterCache, Watch};
//! use xds_types::cluster::Cluster;
//!
//! let cache = ClusterCache::new();
//! let mut watch = Watch::new();
//! cache.register(watch.id(), watch.notifier(), 0);
//!
//! cache.update(vec![Cluster { name: "default/kuard/80".into(), ..Default::default() }]);
//! assert_eq!(watch.try_recv(), Some(1));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

mod adapters;
mod cache;
mod registry;
mod snapshot;
mod stats;
mod watch;

pub use adapters::{
    ClusterCache, EndpointCache, ListenerCache, ResourceAdapter, RouteCache, SecretCache,
};
pub use cache::ResourceCache;
pub use registry::{Caches, ResourceRegistry};
pub use snapshot::Snapshot;
pub use stats::CacheStats;
pub use watch::{Notified, Notifier, Waiters, Watch, WatchId};
