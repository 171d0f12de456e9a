use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex, Weak},
};

use crate::{
    backing::{Context, Layout},
    cache::{CacheComponent, CacheConfig},
    calendar::{
        host::{EraStart, Host},
        registry::RegistryInner,
        weekday_after, Calendar, CalendarKind,
    },
    fmt::{weekday_symbol, SymbolStyle, UnitFormatter},
};

/// An identity-unique handle to a [`Calendar`] configuration.
///
/// Wrappers are created by [`CalendarRegistry::intern`](crate::CalendarRegistry::intern).
/// Within one registry, interning equal calendars always returns the same
/// wrapper for as long as some handle to it is alive. Cloning a wrapper is
/// cheap and returns another handle to the same wrapper.
///
/// Every calendar unit holds the wrapper of its calendar. Units are only
/// comparable with units of the same wrapper, and the wrapper owns all of
/// the caches used by navigation on its units.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarKind, CalendarRegistry};
///
/// let registry = CalendarRegistry::new();
/// let a = registry.intern(Calendar::new(CalendarKind::Chinese));
/// let b = registry.intern(Calendar::new(CalendarKind::Chinese));
/// assert_eq!(a, b);
///
/// let c = registry.intern(Calendar::gregorian());
/// assert_ne!(a, c);
/// ```
#[derive(Clone)]
pub struct CalendarWrapper {
    inner: Arc<WrapperInner>,
}

pub(crate) struct WrapperInner {
    calendar: Calendar,
    layout: Layout,
    era_starts: Vec<EraStart>,
    config: CacheConfig,
    caches: Mutex<HashMap<TypeId, CacheSlot>>,
    formatters: Mutex<HashMap<TypeId, Arc<UnitFormatter>>>,
    registry: Weak<RegistryInner>,
}

/// A cache component stored twice: once to downcast it back to its
/// concrete type and once to size and purge it.
struct CacheSlot {
    any: Arc<dyn Any + Send + Sync>,
    component: Arc<dyn CacheComponent>,
}

impl CalendarWrapper {
    /// Creates a new wrapper. This picks the packed value layout and
    /// locates the start of every regnal era, which is why wrappers are
    /// interned rather than created per unit.
    ///
    /// # Panics
    ///
    /// When the calendar has more eras than the widest layout can store.
    pub(crate) fn new(
        calendar: Calendar,
        config: CacheConfig,
        registry: Weak<RegistryInner>,
    ) -> CalendarWrapper {
        let kind = calendar.kind();
        let layout = Layout::for_era_count(kind.era_count());
        let era_starts = Host::new(kind, &[]).find_era_starts();
        debug!(
            "created {kind} calendar wrapper with {layout:?} layout \
             and {} regnal era starts",
            era_starts.len(),
        );
        let inner = WrapperInner {
            calendar,
            layout,
            era_starts,
            config,
            caches: Mutex::new(HashMap::new()),
            formatters: Mutex::new(HashMap::new()),
            registry,
        };
        CalendarWrapper { inner: Arc::new(inner) }
    }

    pub(crate) fn from_inner(inner: Arc<WrapperInner>) -> CalendarWrapper {
        CalendarWrapper { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<WrapperInner> {
        Arc::downgrade(&self.inner)
    }

    /// Returns the calendar configuration of this wrapper.
    pub fn calendar(&self) -> &Calendar {
        &self.inner.calendar
    }

    /// Returns the calendar system of this wrapper.
    pub fn kind(&self) -> CalendarKind {
        self.inner.calendar.kind()
    }

    /// Returns the cache configuration this wrapper was created with.
    pub fn cache_config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Returns the total number of cached entries for all unit types of
    /// this calendar.
    pub fn cache_len(&self) -> usize {
        self.components().iter().map(|c| c.len()).sum()
    }

    /// Drops rarely used entries from every cache of this calendar,
    /// regardless of how many entries there are.
    pub fn purge_cache(&self) {
        let factor = self.inner.config.get_purge_factor();
        for component in self.components() {
            component.purge(factor);
        }
    }

    /// Returns the symbols of all weekdays, starting with the first weekday
    /// of this calendar.
    ///
    /// # Example
    ///
    /// ```
    /// use calunit::{Calendar, CalendarRegistry, SymbolStyle};
    /// use jiff::civil::Weekday;
    ///
    /// let registry = CalendarRegistry::new();
    /// let cal = registry.intern(
    ///     Calendar::gregorian().first_weekday(Weekday::Sunday),
    /// );
    /// assert_eq!(
    ///     cal.weekday_symbols(SymbolStyle::VeryShort),
    ///     ["S", "M", "T", "W", "T", "F", "S"],
    /// );
    /// ```
    pub fn weekday_symbols(&self, style: SymbolStyle) -> [&'static str; 7] {
        let first = self.inner.calendar.get_first_weekday();
        let mut symbols = [""; 7];
        for (i, symbol) in symbols.iter_mut().enumerate() {
            // OK because `i` is less than 7.
            let wd = weekday_after(first, i64::try_from(i).unwrap());
            *symbol = weekday_symbol(wd, style);
        }
        symbols
    }

    pub(crate) fn context(&self) -> Context<'_> {
        Context {
            host: Host::new(self.kind(), &self.inner.era_starts),
            layout: self.inner.layout,
            calendar: &self.inner.calendar,
        }
    }

    /// Returns the cache component of type `C`, creating it on first use.
    ///
    /// This returns `None` when caching is disabled.
    pub(crate) fn cache<C>(&self, create: impl FnOnce() -> C) -> Option<Arc<C>>
    where
        C: CacheComponent + Any + Send + Sync,
    {
        if !self.inner.config.get_enabled() {
            return None;
        }
        let mut caches = self.inner.caches.lock().unwrap();
        let slot = caches.entry(TypeId::of::<C>()).or_insert_with(|| {
            let cache = Arc::new(create());
            CacheSlot { any: cache.clone(), component: cache }
        });
        // OK because slots are keyed by the `TypeId` of their contents.
        Some(Arc::clone(&slot.any).downcast::<C>().unwrap())
    }

    /// Purges every cache component when the total number of cached entries
    /// exceeds the configured threshold.
    ///
    /// Callers must not hold the lock of any cache component.
    pub(crate) fn purge_cache_if_needed(&self) {
        let config = self.inner.config;
        let components = self.components();
        let total: usize = components.iter().map(|c| c.len()).sum();
        if total <= config.get_size_threshold() {
            return;
        }
        for component in components.iter() {
            component.purge(config.get_purge_factor());
        }
        debug!(
            "purged {} calendar caches from {total} to {} entries",
            self.kind(),
            components.iter().map(|c| c.len()).sum::<usize>(),
        );
    }

    fn components(&self) -> Vec<Arc<dyn CacheComponent>> {
        let caches = self.inner.caches.lock().unwrap();
        caches.values().map(|slot| Arc::clone(&slot.component)).collect()
    }

    /// Returns the description formatter for units of type `U`, creating it
    /// on first use.
    pub(crate) fn formatter<U: 'static>(
        &self,
        pattern: &'static str,
    ) -> Arc<UnitFormatter> {
        let mut formatters = self.inner.formatters.lock().unwrap();
        let formatter = formatters
            .entry(TypeId::of::<U>())
            .or_insert_with(|| Arc::new(UnitFormatter::new(self.kind(), pattern)));
        Arc::clone(formatter)
    }

    /// Panics unless `other` is the same wrapper as `self`.
    ///
    /// Units of different calendars have no meaningful relationship, so
    /// mixing them is always a bug in the caller.
    #[track_caller]
    pub(crate) fn assert_same(
        &self,
        other: &CalendarWrapper,
        unit: &str,
        op: &str,
    ) {
        if self != other {
            panic!(
                "{unit} {op} requires units of the same calendar, \
                 but got {self:?} and {other:?}",
            );
        }
    }

    pub(crate) fn ptr_eq(&self, other: &CalendarWrapper) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn same_calendar(inner: &WrapperInner, calendar: &Calendar) -> bool {
        inner.calendar == *calendar
    }
}

impl Eq for CalendarWrapper {}

impl PartialEq for CalendarWrapper {
    fn eq(&self, other: &CalendarWrapper) -> bool {
        self.ptr_eq(other)
    }
}

impl core::hash::Hash for CalendarWrapper {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl core::fmt::Debug for CalendarWrapper {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let cal = &self.inner.calendar;
        f.debug_struct("CalendarWrapper")
            .field("kind", &cal.kind())
            .field("time_zone", &cal.get_time_zone().iana_name())
            .field("first_weekday", &cal.get_first_weekday())
            .field("min_days_in_first_week", &cal.get_min_days_in_first_week())
            .finish()
    }
}

impl Drop for WrapperInner {
    fn drop(&mut self) {
        trace!("dropping {} calendar wrapper", self.calendar.kind());
        if let Some(registry) = self.registry.upgrade() {
            registry.remove_dead();
        }
    }
}
