use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use crate::config::MAX_CACHED_ENGINE_RUNS;
use crate::engines::EngineBundle;
use crate::rate_tables::RateTables;
use crate::site::{Site, SiteKey};

/// Cache key: site content plus the rate tables it was valued under.
type CacheKey = (SiteKey, u32);

/// Engine results memoized by site content and rate-table fingerprint. A
/// horizon change re-discounts the cached bundle instead of re-running the
/// models. Holds at most `capacity` bundles, evicting the oldest first.
#[derive(Resource, Debug)]
pub struct EngineCache {
    entries: HashMap<CacheKey, EngineBundle>,
    order: VecDeque<CacheKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for EngineCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_ENGINE_RUNS)
    }
}

impl EngineCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Bundle for `site` discounted to `horizons`, running the engines only
    /// on a miss.
    pub fn get_or_run(&mut self, site: &Site, rates: &RateTables, horizons: &[u32]) -> EngineBundle {
        let key = (site.key(), rates.fingerprint());
        if let Some(bundle) = self.entries.get(&key) {
            self.hits += 1;
            return bundle.rediscounted(horizons);
        }
        self.misses += 1;
        let bundle = EngineBundle::run(site, rates, horizons);
        self.insert(key, bundle.clone());
        bundle
    }

    fn insert(&mut self, key: CacheKey, bundle: EngineBundle) {
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key);
        self.entries.insert(key, bundle);
    }

    pub fn contains(&self, site: &Site, rates: &RateTables) -> bool {
        self.entries
            .contains_key(&(site.key(), rates.fingerprint()))
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

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drops every entry. Stale entries are already unreachable after a rate
    /// change; this releases their memory.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::tests::reference_site;

    #[test]
    fn test_second_lookup_hits() {
        let mut cache = EngineCache::default();
        let rates = RateTables::default();
        let site = reference_site();
        let first = cache.get_or_run(&site, &rates, &[10]);
        let second = cache.get_or_run(&site, &rates, &[10]);
        assert_eq!(first, second);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_rediscounts_to_new_horizons() {
        let mut cache = EngineCache::default();
        let rates = RateTables::default();
        let site = reference_site();
        cache.get_or_run(&site, &rates, &[10]);
        let moved = cache.get_or_run(&site, &rates, &[30]);
        assert_eq!(moved, EngineBundle::run(&site, &rates, &[30]));
    }

    #[test]
    fn test_different_sites_miss() {
        let mut cache = EngineCache::default();
        let rates = RateTables::default();
        let site = reference_site();
        cache.get_or_run(&site, &rates, &[10]);
        cache.get_or_run(&site.with_area(5_000.0).unwrap(), &rates, &[10]);
        assert_eq!(cache.misses(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(&site, &rates));
    }

    #[test]
    fn test_changed_rates_never_serve_stale_bundle() {
        let mut cache = EngineCache::default();
        let site = reference_site();
        let rates = RateTables::default();
        cache.get_or_run(&site, &rates, &[10]);

        let mut pricier = rates.clone();
        pricier.carbon.market_usd_per_tonne *= 2.0;
        let bundle = cache.get_or_run(&site, &pricier, &[10]);

        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
        assert_eq!(bundle, EngineBundle::run(&site, &pricier, &[10]));
        assert!(cache.contains(&site, &rates));
        assert!(cache.contains(&site, &pricier));
    }

    #[test]
    fn test_full_cache_evicts_oldest_site() {
        let mut cache = EngineCache::with_capacity(3);
        let rates = RateTables::default();
        let base = reference_site();
        let sites: Vec<Site> = (1..=4)
            .map(|i| base.with_area(1_000.0 * i as f64).unwrap())
            .collect();
        for site in &sites {
            cache.get_or_run(site, &rates, &[10]);
        }

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&sites[0], &rates));
        for site in &sites[1..] {
            assert!(cache.contains(site, &rates));
        }
        // The evicted site is recomputed, not lost.
        cache.get_or_run(&sites[0], &rates, &[10]);
        assert_eq!(cache.misses(), 5);
        assert_eq!(cache.len(), 3);
    }
}
