use calunit::{
    Calendar, CalendarKind, CalendarRegistry, CalendarUnit, DateInterval,
    Month,
};
use jiff::civil::{date, Weekday};

#[test]
fn interning_is_by_configuration() {
    let _ = crate::Logger::init();

    let registry = CalendarRegistry::new();
    let a = registry.intern(Calendar::gregorian());
    let b = registry.intern(Calendar::gregorian());
    assert_eq!(a, b);
    assert_eq!(registry.len(), 1);

    let c = registry.intern(Calendar::gregorian().first_weekday(Weekday::Sunday));
    let d = registry.intern(Calendar::new(CalendarKind::Hebrew));
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(registry.len(), 3);

    drop((c, d));
    assert_eq!(registry.len(), 1);
}

#[test]
fn separate_registries_do_not_share() {
    let r1 = CalendarRegistry::new();
    let r2 = CalendarRegistry::new();
    let a = r1.intern(Calendar::gregorian());
    let b = r2.intern(Calendar::gregorian());
    assert_ne!(a, b);

    // Units of equal calendars from different registries are different.
    let m1 = Month::from_date(date(2024, 2, 1), &a);
    let m2 = Month::from_date(date(2024, 2, 1), &b);
    assert_ne!(m1, m2);
    assert_eq!(m1.start(), m2.start());
}

#[test]
fn units_keep_their_calendar_alive() {
    let registry = CalendarRegistry::new();
    let month = {
        let cal = registry.intern(Calendar::new(CalendarKind::Persian));
        Month::from_date(date(2024, 3, 20), &cal)
    };
    assert_eq!(registry.len(), 1);
    let again = registry.intern(Calendar::new(CalendarKind::Persian));
    assert_eq!(month.calendar(), &again);
    assert_eq!(month.month(), 1);

    drop((month, again));
    assert!(registry.is_empty());
}

#[test]
fn registries_are_shared_across_threads() {
    let registry = CalendarRegistry::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let cal = registry.intern(Calendar::gregorian());
                let month = Month::from_date(date(2024, 1, 1), &cal);
                month.advanced(i * 3).to_string()
            })
        })
        .collect();
    let months: Vec<String> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(months, ["2024-01", "2024-04", "2024-07", "2024-10"]);
}
