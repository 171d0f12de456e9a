use std::hint::black_box as bb;

use calunit::{CalendarKind, CalendarUnit, CompoundUnit, Day, Month, Year};
use criterion::Criterion;
use jiff::civil::date;

use crate::{benchmark, cache_label, calendar};

pub(super) fn define(c: &mut Criterion) {
    month_weeks(c);
    year_index_of(c);
}

/// Measures materializing every week and day of a month view.
fn month_weeks(c: &mut Criterion) {
    const NAME: &str = "compound/month_days";

    for cached in [true, false] {
        let cal = calendar(CalendarKind::Gregorian, cached);
        let month = Month::from_date(date(2024, 2, 1), &cal);
        let label = cache_label(cached);
        benchmark(c, format!("{NAME}/gregorian/{label}"), |b| {
            b.iter(|| {
                let days: usize = bb(&month).iter().map(|w| w.len()).sum();
                assert_eq!(days, 35);
            })
        });
    }
}

/// Measures finding the index of a month within a lunisolar year, where
/// the leap month makes the first guess wrong.
fn year_index_of(c: &mut Criterion) {
    const NAME: &str = "compound/year_index_of";

    for cached in [true, false] {
        let cal = calendar(CalendarKind::Chinese, cached);
        let year = Year::from_date(date(2023, 6, 1), &cal);
        let month = Month::from_date(date(2023, 12, 1), &cal);
        let label = cache_label(cached);
        benchmark(c, format!("{NAME}/chinese/{label}"), |b| {
            b.iter(|| {
                assert!(bb(&year).index_of(bb(&month)).is_some());
            })
        });
    }
    // Keep `Day` exercised as the innermost subunit as well.
    let cal = calendar(CalendarKind::Gregorian, true);
    let day = Day::from_date(date(2024, 2, 29), &cal);
    let week = day.containing_week();
    benchmark(c, "compound/week_index_of/gregorian/cached", |b| {
        b.iter(|| {
            assert_eq!(bb(&week).index_of(bb(&day)), Some(5));
        })
    });
}
