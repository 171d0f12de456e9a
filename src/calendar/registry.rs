use std::sync::{Arc, Mutex, Weak};

use crate::{
    cache::CacheConfig,
    calendar::{
        wrapper::{CalendarWrapper, WrapperInner},
        Calendar,
    },
};

/// An interning table of [`CalendarWrapper`]s.
///
/// A registry hands out one wrapper per distinct [`Calendar`]
/// configuration. It only holds weak references: once every unit and
/// handle of a wrapper is dropped, the wrapper (and all of its caches) is
/// freed and removed from the registry.
///
/// There is no global registry. Applications create one (typically once)
/// and pass it to wherever calendars are needed. Cloning a registry is
/// cheap and returns another handle to the same table.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarRegistry};
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::gregorian());
/// assert_eq!(registry.len(), 1);
/// assert_eq!(cal, registry.intern(Calendar::gregorian()));
/// assert_eq!(registry.len(), 1);
///
/// drop(cal);
/// assert_eq!(registry.len(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct CalendarRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
pub(crate) struct RegistryInner {
    config: CacheConfig,
    wrappers: Mutex<Vec<Weak<WrapperInner>>>,
}

impl CalendarRegistry {
    /// Creates an empty registry whose calendars use the default cache
    /// configuration.
    pub fn new() -> CalendarRegistry {
        CalendarRegistry::with_config(CacheConfig::new())
    }

    /// Creates an empty registry whose calendars use the given cache
    /// configuration.
    pub fn with_config(config: CacheConfig) -> CalendarRegistry {
        let inner =
            RegistryInner { config, wrappers: Mutex::new(Vec::new()) };
        CalendarRegistry { inner: Arc::new(inner) }
    }

    /// Returns the cache configuration of calendars created by this
    /// registry.
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    /// Returns the live wrapper for the given calendar, creating and
    /// registering a new one if there is none.
    pub fn intern(&self, calendar: Calendar) -> CalendarWrapper {
        // Wrappers upgraded while scanning are dropped only after the lock
        // is released, since dropping the last handle of a wrapper removes
        // it from this registry.
        let mut scanned = vec![];
        let wrapper = {
            let mut wrappers = self.inner.wrappers.lock().unwrap();
            let mut found = None;
            for weak in wrappers.iter() {
                let Some(inner) = weak.upgrade() else { continue };
                if CalendarWrapper::same_calendar(&inner, &calendar) {
                    found = Some(CalendarWrapper::from_inner(inner));
                    break;
                }
                scanned.push(inner);
            }
            match found {
                Some(wrapper) => wrapper,
                None => {
                    let wrapper = CalendarWrapper::new(
                        calendar,
                        self.inner.config,
                        Arc::downgrade(&self.inner),
                    );
                    wrappers.retain(|w| w.strong_count() > 0);
                    wrappers.push(wrapper.downgrade());
                    wrapper
                }
            }
        };
        drop(scanned);
        wrapper
    }

    /// Returns the number of live wrappers in this registry.
    pub fn len(&self) -> usize {
        let wrappers = self.inner.wrappers.lock().unwrap();
        wrappers.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Returns true when this registry has no live wrappers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CalendarRegistry {
    fn default() -> CalendarRegistry {
        CalendarRegistry::new()
    }
}

impl RegistryInner {
    /// Removes the entries of wrappers that have been dropped.
    pub(crate) fn remove_dead(&self) {
        let mut wrappers = self.wrappers.lock().unwrap();
        let _before = wrappers.len();
        wrappers.retain(|w| w.strong_count() > 0);
        trace!(
            "removed {} dropped calendar wrappers from registry",
            _before - wrappers.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::Weekday, tz::TimeZone};

    use crate::calendar::CalendarKind;

    use super::*;

    #[test]
    fn equal_configurations_intern_once() {
        let registry = CalendarRegistry::new();
        let a = registry.intern(
            Calendar::new(CalendarKind::Hebrew).first_weekday(Weekday::Sunday),
        );
        let b = registry.intern(
            Calendar::new(CalendarKind::Hebrew).first_weekday(Weekday::Sunday),
        );
        let c = registry.intern(Calendar::new(CalendarKind::Hebrew));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn time_zone_distinguishes_calendars() {
        let registry = CalendarRegistry::new();
        let utc = registry.intern(Calendar::gregorian());
        let plus2 = registry.intern(
            Calendar::gregorian().time_zone(TimeZone::fixed(jiff::tz::offset(2))),
        );
        assert_ne!(utc, plus2);
    }

    #[test]
    fn dropped_wrappers_are_removed() {
        let registry = CalendarRegistry::new();
        let a = registry.intern(Calendar::gregorian());
        let b = registry.intern(Calendar::new(CalendarKind::Iso));
        assert_eq!(registry.len(), 2);
        drop(a);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.inner.wrappers.lock().unwrap().len(), 1);
        drop(b);
        assert!(registry.is_empty());
    }

    #[test]
    fn separate_registries_are_independent() {
        let r1 = CalendarRegistry::new();
        let r2 = CalendarRegistry::new();
        assert_ne!(
            r1.intern(Calendar::gregorian()),
            r2.intern(Calendar::gregorian()),
        );
    }

    #[test]
    fn concurrent_interning() {
        let registry = CalendarRegistry::new();
        let keep = registry.intern(Calendar::gregorian());
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..100 {
                        let cal = registry.intern(Calendar::gregorian());
                        assert_eq!(cal, keep);
                        let iso = registry.intern(Calendar::new(CalendarKind::Iso));
                        drop(iso);
                    }
                });
            }
        });
        assert!(registry.len() >= 1);
    }
}
