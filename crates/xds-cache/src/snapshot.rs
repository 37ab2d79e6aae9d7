//! Immutable views of cache contents.

use std::collections::BTreeMap;
use std::sync::Arc;

use xds_core::{Resource, ResourceVersion};

/// The contents of a cache at one version.
///
/// Holding a snapshot keeps that version's map alive; later updates replace
/// the cache's map rather than mutating it, so the view never changes.
#[derive(Debug)]
pub struct Snapshot<T> {
    version: u64,
    resources: Arc<BTreeMap<String, T>>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            resources: Arc::clone(&self.resources),
        }
    }
}

impl<T: Resource> Snapshot<T> {
    pub(crate) fn new(version: u64, resources: Arc<BTreeMap<String, T>>) -> Self {
        Self { version, resources }
    }

    #[inline]
    pub fn version(&self) -> ResourceVersion {
        ResourceVersion::new(self.version)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.resources.get(name)
    }

    /// Resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.resources.values()
    }

    /// Resources named in `names`, in name order. Unknown names are skipped;
    /// an empty list selects everything.
    pub fn select(&self, names: &[String]) -> Vec<&T> {
        if names.is_empty() {
            return self.iter().collect();
        }
        let mut wanted: Vec<&str> = names.iter().map(String::as_str).collect();
        wanted.sort_unstable();
        wanted.dedup();
        wanted
            .into_iter()
            .filter_map(|name| self.resources.get(name))
            .collect()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
