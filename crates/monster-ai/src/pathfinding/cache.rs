//! Bounded LRU cache of computed paths.
//!
//! Entries are keyed by `(start, goal, map version)`. Observing a different map
//! version drops every entry, so a path is only ever served for the revision it
//! was computed under.
use std::collections::{BTreeMap, HashMap};

use super::Path;
use crate::map::{MapVersion, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub start: Position,
    pub goal: Position,
    pub version: MapVersion,
}

#[derive(Debug)]
struct Entry {
    path: Path,
    stamp: u64,
}

#[derive(Debug)]
pub struct PathCache {
    capacity: usize,
    version: Option<MapVersion>,
    entries: HashMap<CacheKey, Entry>,
    /// Access stamp -> key, oldest first.
    recency: BTreeMap<u64, CacheKey>,
    clock: u64,
}

impl PathCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            version: None,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every entry if `version` differs from the cached revision.
    ///
    /// Returns true when the cache was invalidated.
    pub fn observe_version(&mut self, version: MapVersion) -> bool {
        match self.version {
            Some(current) if current == version => false,
            previous => {
                let invalidated = previous.is_some() && !self.entries.is_empty();
                self.clear();
                self.version = Some(version);
                invalidated
            }
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<Path> {
        if self.version != Some(key.version) {
            return None;
        }
        let stamp = self.tick();
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.stamp);
        entry.stamp = stamp;
        self.recency.insert(stamp, *key);
        Some(entry.path.clone())
    }

    pub fn insert(&mut self, key: CacheKey, path: Path) {
        self.observe_version(key.version);
        let stamp = self.tick();
        if let Some(previous) = self.entries.insert(key, Entry { path, stamp }) {
            self.recency.remove(&previous.stamp);
        }
        self.recency.insert(stamp, key);

        while self.entries.len() > self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(goal: i32, version: u64) -> CacheKey {
        CacheKey {
            start: Position::ORIGIN,
            goal: Position::new(0, goal),
            version: MapVersion(version),
        }
    }

    fn path_to(goal: i32) -> Path {
        Path::from_cells((0..=goal).map(|col| Position::new(0, col)).collect())
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = PathCache::new(2);
        cache.insert(key(1, 0), path_to(1));
        cache.insert(key(2, 0), path_to(2));

        // Touch the first entry so the second becomes the eviction victim.
        assert!(cache.get(&key(1, 0)).is_some());
        cache.insert(key(3, 0), path_to(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1, 0)).is_some());
        assert!(cache.get(&key(2, 0)).is_none());
        assert!(cache.get(&key(3, 0)).is_some());
    }

    #[test]
    fn new_version_invalidates_everything() {
        let mut cache = PathCache::new(8);
        cache.insert(key(1, 0), path_to(1));
        cache.insert(key(2, 0), path_to(2));

        assert!(cache.observe_version(MapVersion(1)));
        assert!(cache.is_empty());
        assert!(cache.get(&key(1, 0)).is_none());
        assert!(!cache.observe_version(MapVersion(1)));
    }

    #[test]
    fn lookups_for_stale_versions_miss() {
        let mut cache = PathCache::new(8);
        cache.insert(key(1, 3), path_to(1));
        assert!(cache.get(&key(1, 2)).is_none());
        assert_eq!(cache.get(&key(1, 3)), Some(path_to(1)));
    }
}
