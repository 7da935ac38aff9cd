//! TTL cache of formatted price strings.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Prices stay valid this long before a re-fetch.
pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct PriceCacheEntry {
    price: String,
    fetched_at: Instant,
}

/// Concurrent price cache with lazy expiry.
///
/// Keys are canonical: plan code plus the option codes sorted
/// lexicographically, so permutations of the same option set share one
/// entry. Expired entries are evicted on read; there is no sweeper.
#[derive(Debug)]
pub struct PriceCache {
    entries: DashMap<String, PriceCacheEntry>,
    ttl: Duration,
}

impl PriceCache {
    /// Cache with the standard 3-day TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(PRICE_CACHE_TTL)
    }

    /// Cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a price. An expired entry is removed and reported a miss.
    #[must_use]
    pub fn get(&self, plan_code: &str, options: &[String]) -> Option<String> {
        let key = cache_key(plan_code, options);
        {
            let entry = self.entries.get(&key)?;
            if entry.fetched_at.elapsed() < self.ttl {
                return Some(entry.price.clone());
            }
        }
        // guard dropped above, safe to remove from the same shard
        self.entries.remove(&key);
        debug!(key = %key, "price cache entry expired");
        None
    }

    /// Store a price, refreshing the entry's clock.
    pub fn set(&self, plan_code: &str, options: &[String], price: &str) {
        let key = cache_key(plan_code, options);
        debug!(key = %key, price = %price, "price cached");
        self.entries.insert(
            key,
            PriceCacheEntry {
                price: price.to_string(),
                fetched_at: Instant::now(),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_key(plan_code: &str, options: &[String]) -> String {
    let mut sorted: Vec<&str> = options.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{plan_code}|{}", sorted.join(","))
}
