//! Transformed page cache
//!
//! Maps file names to the bytes served for them. Entries are immutable
//! [`Page`] snapshots behind an `Arc`: a writer builds the whole page before
//! swapping it in, and a reader clones the `Arc` under the lock and serves
//! it after releasing it. A reader therefore sees either the old page or the
//! new one, never a mix.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default number of cached pages
pub const DEFAULT_CAPACITY: usize = 256;

/// One cached page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    bytes: Vec<u8>,
    injected: bool,
}

impl Page {
    /// Page whose bytes had the live-reload fragment spliced in
    pub fn injected(bytes: impl Into<Vec<u8>>) -> Self {
        Page {
            bytes: bytes.into(),
            injected: true,
        }
    }

    /// Page served exactly as read from disk
    pub fn unmodified(bytes: impl Into<Vec<u8>>) -> Self {
        Page {
            bytes: bytes.into(),
            injected: false,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the fragment was inserted
    #[inline]
    pub fn is_injected(&self) -> bool {
        self.injected
    }
}

/// Bounded, thread-safe map from file name to page snapshot
pub struct PageCache {
    entries: Mutex<LruCache<String, Arc<Page>>>,
}

impl PageCache {
    /// Create a cache holding at most `capacity` pages (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PageCache {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Swap in a new snapshot for `name`, returning the one it replaced
    pub fn insert(&self, name: impl Into<String>, page: Page) -> Option<Arc<Page>> {
        self.insert_shared(name, Arc::new(page))
    }

    /// Like [`PageCache::insert`] for a snapshot the caller also keeps
    pub fn insert_shared(&self, name: impl Into<String>, page: Arc<Page>) -> Option<Arc<Page>> {
        self.lock().put(name.into(), page)
    }

    /// Current snapshot for `name`
    pub fn get(&self, name: &str) -> Option<Arc<Page>> {
        self.lock().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Page>> {
        self.lock().pop(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Grow the capacity to at least `count` pages. Never shrinks.
    pub fn reserve(&self, count: usize) {
        let mut entries = self.lock();
        if let Some(wanted) = NonZeroUsize::new(count) {
            if wanted > entries.cap() {
                entries.resize(wanted);
            }
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic elsewhere cannot leave an entry half-written, so a poisoned
    // lock is still usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<Page>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PageCache {
    fn default() -> Self {
        PageCache::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for PageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_insert_and_get() {
        let cache = PageCache::new(4);
        assert!(cache.insert("index.html", Page::injected("<html/>")).is_none());
        let page = cache.get("index.html").unwrap();
        assert_eq!(page.bytes(), b"<html/>");
        assert!(page.is_injected());
        assert!(cache.get("missing.html").is_none());
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let cache = PageCache::new(4);
        cache.insert("a.html", Page::unmodified("old"));
        let held = cache.get("a.html").unwrap();

        let replaced = cache.insert("a.html", Page::unmodified("new")).unwrap();
        assert_eq!(replaced.bytes(), b"old");
        assert_eq!(held.bytes(), b"old");
        assert_eq!(cache.get("a.html").unwrap().bytes(), b"new");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = PageCache::new(2);
        cache.insert("a", Page::unmodified("a"));
        cache.insert("b", Page::unmodified("b"));
        cache.get("a");
        cache.insert("c", Page::unmodified("c"));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_insert_shared_keeps_same_snapshot() {
        let cache = PageCache::new(2);
        let page = Arc::new(Page::injected("x"));
        cache.insert_shared("x.html", Arc::clone(&page));
        assert!(Arc::ptr_eq(&cache.get("x.html").unwrap(), &page));
    }

    #[test]
    fn test_reserve_grows_only() {
        let cache = PageCache::new(2);
        cache.insert("a", Page::unmodified("a"));
        cache.insert("b", Page::unmodified("b"));
        cache.reserve(3);
        assert_eq!(cache.capacity(), 3);
        cache.insert("c", Page::unmodified("c"));
        assert!(["a", "b", "c"].iter().all(|name| cache.contains(name)));

        cache.reserve(1);
        assert_eq!(cache.capacity(), 3);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = PageCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("a", Page::unmodified("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = PageCache::default();
        cache.insert("a", Page::unmodified("a"));
        cache.insert("b", Page::unmodified("b"));
        assert_eq!(cache.remove("a").unwrap().bytes(), b"a");
        assert!(cache.remove("a").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_readers_see_whole_pages() {
        let cache = Arc::new(PageCache::new(4));
        cache.insert("p", Page::unmodified(vec![b'a'; 1024]));

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200 {
                    let fill = if i % 2 == 0 { b'b' } else { b'a' };
                    cache.insert("p", Page::unmodified(vec![fill; 1024]));
                }
            })
        };

        for _ in 0..200 {
            let page = cache.get("p").unwrap();
            let first = page.bytes()[0];
            assert!(page.bytes().iter().all(|&b| b == first));
        }

        writer.join().unwrap();
    }
}
