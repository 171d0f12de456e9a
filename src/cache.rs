/*!
Usage weighted caches for calendar unit arithmetic.

Every [`CalendarWrapper`](crate::CalendarWrapper) owns one cache component
per unit type: a [`UnitCache`] for distances and advances and, for compound
units, a [`CompoundCache`] for subunit lookups. Components are keyed by
backing values only. They never hold a unit (and therefore never hold the
wrapper that owns them).

Each entry counts how often it has been read. When the total number of
entries across all components of a wrapper exceeds the configured size
threshold, every component drops the entries whose count is below
`floor(purge_factor * max_count)`, where `max_count` is the largest count in
that map.

Caching never changes results. Disabling it through [`CacheConfig`] turns
every lookup into a miss.
*/

use std::{collections::HashMap, hash::Hash, sync::Mutex};

use crate::{backing::Backing, error::Error, unit::Body};

/// The default number of entries a calendar may cache before purging.
const DEFAULT_SIZE_THRESHOLD: usize = 20 * 1024;

/// The default fraction of the maximum usage count an entry needs in order
/// to survive a purge.
const DEFAULT_PURGE_FACTOR: f64 = 0.5;

/// Configuration for the caches of every calendar created by a
/// [`CalendarRegistry`](crate::CalendarRegistry).
///
/// A purge drops the entries of a map whose read count is below
/// `floor(purge_factor * max_count)`. Entries are only counted when a
/// lookup reads them back, not when they are inserted. So until some entry
/// of a map has been read, a purge keeps every entry of that map and the
/// cache may grow past the size threshold. Walking forward through new
/// units without ever repeating a lookup is the typical case.
///
/// # Example
///
/// ```
/// use calunit::{CacheConfig, CalendarRegistry};
///
/// let config = CacheConfig::new().size_threshold(1024).purge_factor(0.25);
/// let registry = CalendarRegistry::with_config(config);
/// assert_eq!(registry.config().get_size_threshold(), 1024);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheConfig {
    enabled: bool,
    size_threshold: usize,
    purge_factor: f64,
}

impl CacheConfig {
    /// Creates the default cache configuration: caching is enabled, the
    /// size threshold is 20480 entries and the purge factor is `0.5`.
    pub fn new() -> CacheConfig {
        CacheConfig {
            enabled: true,
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            purge_factor: DEFAULT_PURGE_FACTOR,
        }
    }

    /// Enables or disables caching.
    ///
    /// A disabled cache never stores anything. This is mostly useful for
    /// testing and benchmarking.
    pub fn enabled(self, yes: bool) -> CacheConfig {
        CacheConfig { enabled: yes, ..self }
    }

    /// Sets the total number of cached entries per calendar above which
    /// caches are purged.
    pub fn size_threshold(self, entries: usize) -> CacheConfig {
        CacheConfig { size_threshold: entries, ..self }
    }

    /// Sets the fraction of the maximum usage count that an entry needs to
    /// survive a purge.
    ///
    /// A map in which no entry has been read yet has a maximum usage count
    /// of zero, so a purge keeps all of its entries regardless of the
    /// factor.
    ///
    /// # Panics
    ///
    /// When `factor` is not in the range `0.0..=1.0`. Use
    /// [`CacheConfig::try_purge_factor`] for a fallible version.
    pub fn purge_factor(self, factor: f64) -> CacheConfig {
        match self.try_purge_factor(factor) {
            Ok(config) => config,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`CacheConfig::purge_factor`], but returns an error when the
    /// factor is not in the range `0.0..=1.0`.
    pub fn try_purge_factor(self, factor: f64) -> Result<CacheConfig, Error> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(crate::error::err!(
                "purge factor must be in the range 0.0..=1.0, but got {factor}"
            ));
        }
        Ok(CacheConfig { purge_factor: factor, ..self })
    }

    /// Returns whether caching is enabled.
    pub fn get_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the size threshold above which caches are purged.
    pub fn get_size_threshold(&self) -> usize {
        self.size_threshold
    }

    /// Returns the purge factor.
    pub fn get_purge_factor(&self) -> f64 {
        self.purge_factor
    }
}

impl Default for CacheConfig {
    fn default() -> CacheConfig {
        CacheConfig::new()
    }
}

/// A cache component that can report its size and be purged.
///
/// Calendar wrappers keep their components as trait objects keyed by
/// `TypeId`, which is how heterogeneous per-unit caches are summed and
/// purged together.
pub(crate) trait CacheComponent: Send + Sync {
    /// Returns the number of entries across all maps of this component.
    fn len(&self) -> usize;

    /// Drops rarely used entries from every map of this component.
    fn purge(&self, factor: f64);
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    uses: u32,
}

/// A map whose entries count how many times they have been read.
#[derive(Debug)]
pub(crate) struct UsageMap<K, V> {
    map: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V> UsageMap<K, V> {
    pub(crate) fn new() -> UsageMap<K, V> {
        UsageMap { map: HashMap::new() }
    }

    /// Returns the value for `key` and counts the read.
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        let entry = self.map.get_mut(key)?;
        entry.uses = entry.uses.saturating_add(1);
        Some(&entry.value)
    }

    /// Stores a value, replacing any previous one and resetting its count.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, Entry { value, uses: 0 });
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Drops every entry whose count is below `floor(factor * max)`.
    pub(crate) fn purge(&mut self, factor: f64) {
        let Some(max) = self.map.values().map(|e| e.uses).max() else {
            return;
        };
        let threshold = (f64::from(max) * factor).floor() as u32;
        self.map.retain(|_, e| e.uses >= threshold);
    }

    #[cfg(test)]
    fn uses(&self, key: &K) -> Option<u32> {
        self.map.get(key).map(|e| e.uses)
    }
}

#[derive(Debug)]
struct StrideMaps<V> {
    distances: UsageMap<(V, V), i32>,
    advances: UsageMap<(V, i32), Body<V>>,
}

/// Cached distances and advances between units of one type.
#[derive(Debug)]
pub(crate) struct UnitCache<V> {
    maps: Mutex<StrideMaps<V>>,
}

impl<V: Backing> UnitCache<V> {
    pub(crate) fn new() -> UnitCache<V> {
        UnitCache {
            maps: Mutex::new(StrideMaps {
                distances: UsageMap::new(),
                advances: UsageMap::new(),
            }),
        }
    }

    pub(crate) fn distance(&self, from: &V, to: &V) -> Option<i32> {
        let key = (from.clone(), to.clone());
        self.maps.lock().unwrap().distances.get(&key).copied()
    }

    pub(crate) fn advance(&self, from: &V, by: i32) -> Option<Body<V>> {
        let key = (from.clone(), by);
        self.maps.lock().unwrap().advances.get(&key).cloned()
    }

    /// Records that `to` is `by` units after `from`, in both directions.
    pub(crate) fn record(&self, from: &Body<V>, by: i32, to: &Body<V>) {
        let (a, b) = (from.value.clone(), to.value.clone());
        let mut maps = self.maps.lock().unwrap();
        maps.distances.insert((a.clone(), b.clone()), by);
        maps.advances.insert((a.clone(), by), to.clone());
        // Negating `i32::MIN` overflows. Such a pair only has one direction.
        if let Some(back) = by.checked_neg() {
            maps.distances.insert((b.clone(), a), back);
            maps.advances.insert((b, back), from.clone());
        }
    }
}

impl<V: Backing> CacheComponent for UnitCache<V> {
    fn len(&self) -> usize {
        let maps = self.maps.lock().unwrap();
        maps.distances.len() + maps.advances.len()
    }

    fn purge(&self, factor: f64) {
        let mut maps = self.maps.lock().unwrap();
        maps.distances.purge(factor);
        maps.advances.purge(factor);
    }
}

#[derive(Debug)]
struct SubunitMaps<V, E> {
    elements: UsageMap<(V, i32), Body<E>>,
    indices: UsageMap<(V, E), i32>,
}

/// Cached subunit lookups of one compound unit type.
#[derive(Debug)]
pub(crate) struct CompoundCache<V, E> {
    maps: Mutex<SubunitMaps<V, E>>,
}

impl<V: Backing, E: Backing> CompoundCache<V, E> {
    pub(crate) fn new() -> CompoundCache<V, E> {
        CompoundCache {
            maps: Mutex::new(SubunitMaps {
                elements: UsageMap::new(),
                indices: UsageMap::new(),
            }),
        }
    }

    pub(crate) fn element(&self, unit: &V, index: i32) -> Option<Body<E>> {
        let key = (unit.clone(), index);
        self.maps.lock().unwrap().elements.get(&key).cloned()
    }

    pub(crate) fn index(&self, unit: &V, element: &E) -> Option<i32> {
        let key = (unit.clone(), element.clone());
        self.maps.lock().unwrap().indices.get(&key).copied()
    }

    /// Records that `element` is at `index` within `unit`, in both
    /// directions.
    pub(crate) fn record(&self, unit: &V, index: i32, element: &Body<E>) {
        let mut maps = self.maps.lock().unwrap();
        maps.elements.insert((unit.clone(), index), element.clone());
        maps.indices.insert((unit.clone(), element.value.clone()), index);
    }
}

impl<V: Backing, E: Backing> CacheComponent for CompoundCache<V, E> {
    fn len(&self) -> usize {
        let maps = self.maps.lock().unwrap();
        maps.elements.len() + maps.indices.len()
    }

    fn purge(&self, factor: f64) {
        let mut maps = self.maps.lock().unwrap();
        maps.elements.purge(factor);
        maps.indices.purge(factor);
    }
}
