//! Resolver cache — amortizes repeated `go list` invocations across scans.
//!
//! Keys carry a content hash, so an edited module misses immediately. The
//! cache is a pure optimization: with [`NoopCache`] every lookup misses and
//! observable results are identical, just slower. Writes are idempotent, so
//! two concurrent scans racing on the same key at worst waste a subprocess
//! invocation.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Cache key: which module, with which exact content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub module_path: PathBuf,
    pub content_hash: String,
}

impl CacheKey {
    /// Key for `module_path` with the given content.
    pub fn for_content(module_path: &Path, content: &str) -> Self {
        Self {
            module_path: module_path.to_path_buf(),
            content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        }
    }
}

/// Storage for resolved intra-project package directories.
pub trait ResolveCache: Send + Sync {
    /// Look up a previous resolution. `None` means the caller must invoke
    /// the tool.
    fn get(&self, key: &CacheKey) -> Option<BTreeSet<PathBuf>>;

    /// Record a resolution. Overwriting an existing key with an equal value
    /// must be harmless.
    fn insert(&self, key: CacheKey, dirs: BTreeSet<PathBuf>);
}

/// Process-lifetime in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, BTreeSet<PathBuf>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResolveCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<BTreeSet<PathBuf>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn insert(&self, key: CacheKey, dirs: BTreeSet<PathBuf>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, dirs);
        }
    }
}

/// Cache that never hits. Used in tests to prove cache presence does not
/// change results, and by callers that want every scan to hit the tool.
#[derive(Debug, Default)]
pub struct NoopCache;

impl ResolveCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<BTreeSet<PathBuf>> {
        None
    }

    fn insert(&self, _key: CacheKey, _dirs: BTreeSet<PathBuf>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn dirs(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_key_tracks_content() {
        let a = CacheKey::for_content(Path::new("m.go"), "package main\n");
        let b = CacheKey::for_content(Path::new("m.go"), "package main\n");
        let c = CacheKey::for_content(Path::new("m.go"), "package main // edited\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_tracks_path() {
        let a = CacheKey::for_content(Path::new("a/m.go"), "x");
        let b = CacheKey::for_content(Path::new("b/m.go"), "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        let key = CacheKey::for_content(Path::new("m.go"), "x");
        assert!(cache.get(&key).is_none());

        cache.insert(key.clone(), dirs(&["src/control/common"]));
        assert_eq!(cache.get(&key), Some(dirs(&["src/control/common"])));
    }

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopCache;
        let key = CacheKey::for_content(Path::new("m.go"), "x");
        cache.insert(key.clone(), dirs(&["src/control/common"]));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn test_concurrent_idempotent_inserts() {
        let cache = Arc::new(MemoryCache::new());
        let key = CacheKey::for_content(Path::new("m.go"), "x");
        let expected = dirs(&["src/control/common", "src/control/lib/daos"]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                let value = expected.clone();
                std::thread::spawn(move || cache.insert(key, value))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.get(&key), Some(expected));
    }
}
