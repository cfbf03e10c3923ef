use crate::pki::ClassifiedCertificate;
use log::debug;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

pub type Listing = Arc<Vec<ClassifiedCertificate>>;

struct Slots {
    entries: LruCache<String, (Listing, Instant)>,
    /// Bumped by `invalidate`; a fill started under an older generation is
    /// discarded.
    generations: HashMap<String, u64>,
}

/// Short-lived memo of classified listings, one slot per authority.
/// Never authoritative: entries expire after `ttl` and revocation drops the
/// authority's slot explicitly. A listing fetched before an invalidation
/// never lands in the cache after it.
pub struct InventoryCache {
    slots: Arc<RwLock<Slots>>,
    ttl: Duration,
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
}

impl InventoryCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Arc::new(RwLock::new(Slots {
                entries: LruCache::new(capacity),
                generations: HashMap::new(),
            })),
            ttl,
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn get(&self, ca: &str) -> Option<Listing> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .entries
            .get(ca)
            .map(|(listing, stored_at)| (listing.clone(), stored_at.elapsed() < self.ttl));
        let fresh = match slot {
            Some((listing, true)) => Some(listing),
            Some((_, false)) => {
                slots.entries.pop(ca);
                debug!("listing cache entry for {} expired", ca);
                None
            }
            None => None,
        };

        let counter = if fresh.is_some() {
            &self.cache_hits
        } else {
            &self.cache_misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        fresh
    }

    /// Generation to hand back to [`InventoryCache::put`] once the listing
    /// has been fetched.
    pub async fn generation(&self, ca: &str) -> u64 {
        self.slots
            .read()
            .await
            .generations
            .get(ca)
            .copied()
            .unwrap_or(0)
    }

    /// Stores `listing` unless `ca` was invalidated since `generation` was
    /// read. Returns whether it was stored.
    pub async fn put(&self, ca: &str, listing: Listing, generation: u64) -> bool {
        let mut slots = self.slots.write().await;
        if slots.generations.get(ca).copied().unwrap_or(0) != generation {
            debug!("discarding listing for {} fetched before invalidation", ca);
            return false;
        }
        slots
            .entries
            .put(ca.to_string(), (listing, Instant::now()));
        true
    }

    pub async fn invalidate(&self, ca: &str) {
        let mut slots = self.slots.write().await;
        *slots.generations.entry(ca.to_string()).or_insert(0) += 1;
        if slots.entries.pop(ca).is_some() {
            debug!("listing cache entry for {} invalidated", ca);
        }
    }

    /// Share of lookups served from the cache, in percent.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.cache_hits.load(Ordering::Relaxed) as f64;
        let lookups = hits + self.cache_misses.load(Ordering::Relaxed) as f64;
        if lookups > 0.0 {
            hits * 100.0 / lookups
        } else {
            0.0
        }
    }
}
