#![forbid(unsafe_code)]

use std::sync::Arc;

use dashmap::DashMap;
use strata_backend::Blob;
use strata_path::StorePath;

/// Per-path memoization of blob lists and child-key lists.
///
/// The cache is a dumb store: the engine decides when to fetch and what to
/// invalidate. Entries for different paths live in separate shards
/// (`DashMap`), so lookups for unrelated paths never contend. When
/// constructed disabled, lookups miss and stores are dropped, which gives
/// the bypass path a single shape in the engine.
///
/// One entry per queried path; mutations remove the entry for every path
/// they touch as their last local step, which is what makes a follow-up
/// read from the same connector observe the mutation.
#[derive(Debug)]
pub(crate) struct ListingCache {
    enabled: bool,
    blobs: DashMap<String, Arc<Vec<Blob>>>,
    children: DashMap<String, Arc<Vec<String>>>,
}

impl ListingCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            blobs: DashMap::new(),
            children: DashMap::new(),
        }
    }

    pub(crate) fn blobs(&self, path: &StorePath) -> Option<Arc<Vec<Blob>>> {
        if !self.enabled {
            return None;
        }
        self.blobs
            .get(&path.full_qualified_name())
            .map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn put_blobs(&self, path: &StorePath, blobs: Arc<Vec<Blob>>) {
        if self.enabled {
            self.blobs.insert(path.full_qualified_name(), blobs);
        }
    }

    pub(crate) fn children(&self, path: &StorePath) -> Option<Arc<Vec<String>>> {
        if !self.enabled {
            return None;
        }
        self.children
            .get(&path.full_qualified_name())
            .map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn put_children(&self, path: &StorePath, children: Arc<Vec<String>>) {
        if self.enabled {
            self.children.insert(path.full_qualified_name(), children);
        }
    }

    /// Drop whatever is memoized for `path`.
    pub(crate) fn invalidate(&self, path: &StorePath) {
        let name = path.full_qualified_name();
        self.blobs.remove(&name);
        self.children.remove(&name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(name: &str) -> StorePath {
        StorePath::new("store", [name]).unwrap()
    }

    #[test]
    fn stores_and_returns_entries() {
        let cache = ListingCache::new(true);
        let file = path("file");

        assert!(cache.blobs(&file).is_none());
        cache.put_blobs(&file, Arc::new(vec![Blob::new("file.0", 0, 4)]));
        assert_eq!(cache.blobs(&file).unwrap().len(), 1);
    }

    #[test]
    fn entries_are_per_path() {
        let cache = ListingCache::new(true);
        cache.put_blobs(&path("a"), Arc::new(vec![Blob::new("a.0", 0, 1)]));

        assert!(cache.blobs(&path("b")).is_none());
    }

    #[test]
    fn invalidate_drops_both_kinds() {
        let cache = ListingCache::new(true);
        let dir = path("dir");

        cache.put_blobs(&dir, Arc::new(vec![]));
        cache.put_children(&dir, Arc::new(vec!["dir/a.0".into()]));
        cache.invalidate(&dir);

        assert!(cache.blobs(&dir).is_none());
        assert!(cache.children(&dir).is_none());
    }

    #[test]
    fn disabled_cache_never_stores() {
        let cache = ListingCache::new(false);
        let file = path("file");

        cache.put_blobs(&file, Arc::new(vec![Blob::new("file.0", 0, 4)]));
        assert!(cache.blobs(&file).is_none());
    }
}
