use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

struct CacheEntry<V> {
    data: V,
    expires_at: Instant,
}

/// In-memory TTL cache. Entries are written on successful upstream calls,
/// never mutated, and overwritten wholesale on refresh. Expired entries stay
/// in the map until the next write for the same key; there is no eviction,
/// so the map grows with the set of distinct keys ever requested.
///
/// The read-check-write sequence is not atomic across concurrent requests:
/// two simultaneous misses for one key may both call upstream, and the last
/// write wins.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn with_ttl(ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let entries = self.entries.read().await;
        if let Some(entry) = entries.get(key)
            && entry.expires_at > Instant::now()
        {
            return Some(entry.data.clone());
        }
        None
    }

    pub async fn set(&self, key: K, data: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                data,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_entry_within_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::with_ttl(600);
        cache.set("london".to_string(), 7).await;

        assert_eq!(cache.get("london").await, Some(7));
    }

    #[tokio::test]
    async fn misses_for_unknown_key() {
        let cache: TtlCache<String, u32> = TtlCache::with_ttl(600);

        assert_eq!(cache.get("london").await, None);
    }

    #[tokio::test]
    async fn expires_entries_after_ttl() {
        let cache: TtlCache<String, u32> = TtlCache::with_ttl(0);
        cache.set("london".to_string(), 7).await;

        assert_eq!(cache.get("london").await, None);
    }

    #[tokio::test]
    async fn overwrites_entry_for_matching_key() {
        let cache: TtlCache<String, u32> = TtlCache::with_ttl(600);
        cache.set("london".to_string(), 7).await;
        cache.set("london".to_string(), 9).await;

        assert_eq!(cache.get("london").await, Some(9));
    }
}
