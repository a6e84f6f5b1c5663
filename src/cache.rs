use axum::body::Bytes;
use dashmap::DashMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Maximum number of rendered cards kept before eviction kicks in
const MAX_CACHE_ENTRIES: usize = 512;
/// Upper bound on an entry's lifetime, keeps `Instant` arithmetic in range.
const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Global render cache, keyed by share token
static CACHE: OnceLock<DashMap<String, CacheEntry>> = OnceLock::new();

/// Rendered card with expiration and access tracking
#[derive(Clone)]
struct CacheEntry {
    png: Bytes,
    expires_at: Instant,
    last_accessed: Instant,
}

fn get_cache() -> &'static DashMap<String, CacheEntry> {
    CACHE.get_or_init(DashMap::new)
}

/// Get a rendered card if it exists and hasn't expired
pub fn get(key: &str) -> Option<Bytes> {
    let cache = get_cache();

    if let Some(mut entry) = cache.get_mut(key) {
        if Instant::now() < entry.expires_at {
            // Update last accessed time (for LRU tracking)
            entry.last_accessed = Instant::now();
            return Some(entry.png.clone());
        }
        // Remove expired entry
        drop(entry);
        cache.remove(key);
    }

    None
}

/// Store a rendered card with TTL (time to live)
pub fn set(key: &str, png: Bytes, ttl: Duration) {
    let cache = get_cache();

    if cache.len() >= MAX_CACHE_ENTRIES {
        evict_lru_entries();
    }

    let now = Instant::now();
    cache.insert(
        key.to_string(),
        CacheEntry {
            png,
            expires_at: now + ttl.min(MAX_TTL),
            last_accessed: now,
        },
    );
}

/// Evict least recently used entries to free up space
/// Removes 20% of entries (sorted by last_accessed time)
fn evict_lru_entries() {
    let cache = get_cache();
    let current_size = cache.len();
    let target_remove = (current_size / 5).max(1);

    let mut entries: Vec<(String, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().last_accessed))
        .collect();

    // Oldest first
    entries.sort_by_key(|(_, last_accessed)| *last_accessed);

    for (key, _) in entries.iter().take(target_remove) {
        cache.remove(key);
    }

    tracing::info!(
        "🗑️  Render cache eviction: removed {} LRU entries (cache size: {} -> {})",
        target_remove,
        current_size,
        cache.len()
    );
}

/// Get cache statistics
pub fn stats() -> CacheStats {
    let cache = get_cache();
    let now = Instant::now();

    let mut total_size = 0;
    let mut expired_count = 0;

    for entry in cache.iter() {
        total_size += entry.value().png.len();
        if now >= entry.value().expires_at {
            expired_count += 1;
        }
    }

    CacheStats {
        entry_count: cache.len(),
        total_size_bytes: total_size,
        expired_count,
    }
}

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_bytes: usize,
    pub expired_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_fresh_entries() {
        set("cache-test-fresh", Bytes::from_static(b"png"), Duration::from_secs(60));
        assert_eq!(get("cache-test-fresh"), Some(Bytes::from_static(b"png")));
    }

    #[test]
    fn drops_expired_entries() {
        set("cache-test-expired", Bytes::from_static(b"png"), Duration::ZERO);
        assert_eq!(get("cache-test-expired"), None);
        assert!(get_cache().get("cache-test-expired").is_none());
    }

    #[test]
    fn huge_ttl_is_capped_instead_of_overflowing() {
        set("cache-test-huge-ttl", Bytes::from_static(b"png"), Duration::MAX);
        assert_eq!(get("cache-test-huge-ttl"), Some(Bytes::from_static(b"png")));
    }
}
