use calunit::{
    CacheConfig, Calendar, CalendarKind, CalendarRegistry, CalendarUnit,
    CompoundUnit, Month, Year,
};
use jiff::civil::date;

#[test]
fn navigation_fills_the_cache() {
    let _ = crate::Logger::init();

    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let month = Month::from_date(date(2024, 2, 1), &cal);
    assert_eq!(cal.cache_len(), 0);

    let next = month.next();
    let filled = cal.cache_len();
    assert!(filled > 0);
    // A second identical step is answered from the cache.
    assert_eq!(month.next(), next);
    assert_eq!(cal.cache_len(), filled);
    // The reverse step was recorded along with the forward one.
    assert_eq!(next.prev(), month);
    assert_eq!(cal.cache_len(), filled);
}

#[test]
fn disabled_cache_stays_empty() {
    let config = CacheConfig::new().enabled(false);
    let registry = CalendarRegistry::with_config(config);
    let cal = registry.intern(Calendar::new(CalendarKind::Chinese));
    let year = Year::from_date(date(2024, 6, 1), &cal);
    for month in year.iter() {
        assert_eq!(year.index_of(&month).map(|i| year.element(i)), Some(month));
    }
    assert_eq!(year.distance(&year.advanced(5)), 5);
    assert_eq!(cal.cache_len(), 0);
}

#[test]
fn cached_and_uncached_agree() {
    let cached = CalendarRegistry::new()
        .intern(Calendar::new(CalendarKind::Hebrew));
    let uncached = CalendarRegistry::with_config(CacheConfig::new().enabled(false))
        .intern(Calendar::new(CalendarKind::Hebrew));

    let describe = |cal| {
        let start = Year::from_date(date(2020, 1, 1), cal);
        (0..10)
            .flat_map(|i| start.advanced(i).iter().collect::<Vec<_>>())
            .map(|m: Month| (m.to_string(), m.start_date(), m.len()))
            .collect::<Vec<_>>()
    };
    // Twice, so that the second pass reads what the first one cached.
    assert_eq!(describe(&cached), describe(&uncached));
    assert_eq!(describe(&cached), describe(&uncached));
}

#[test]
fn explicit_purge() {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let jan = Month::from_date(date(2024, 1, 1), &cal);
    let months: Vec<Month> = (1..=24).map(|i| jan.advanced(i)).collect();
    for _ in 0..5 {
        assert_eq!(jan.advanced(12), months[11]);
    }
    let before = cal.cache_len();
    cal.purge_cache();
    assert!(cal.cache_len() < before);
    assert_eq!(jan.advanced(12), months[11]);
    assert_eq!(jan.distance(&months[23]), 24);
}

#[test]
fn invalid_purge_factor() {
    assert!(CacheConfig::new().try_purge_factor(1.5).is_err());
    assert!(CacheConfig::new().try_purge_factor(f64::NAN).is_err());
    let config = CacheConfig::new().try_purge_factor(0.25).unwrap();
    assert_eq!(config.get_purge_factor(), 0.25);
}
