use std::hint::black_box as bb;

use calunit::{CalendarKind, CalendarUnit, Day, Month};
use criterion::Criterion;
use jiff::civil::date;

use crate::{benchmark, cache_label, calendar};

pub(super) fn define(c: &mut Criterion) {
    scroll_months(c);
    month_distance(c);
    day_containing(c);
}

/// Measures scrolling back and forth through the months around a date.
///
/// This is what a calendar view does when a user flips pages, and is the
/// workload the cache is meant for.
fn scroll_months(c: &mut Criterion) {
    const NAME: &str = "scroll/months";

    for kind in [CalendarKind::Gregorian, CalendarKind::Chinese] {
        for cached in [true, false] {
            let cal = calendar(kind, cached);
            let start = Month::from_date(date(2024, 6, 15), &cal);
            let label = cache_label(cached);
            benchmark(c, format!("{NAME}/{kind}/{label}"), |b| {
                b.iter(|| {
                    let mut month = start.clone();
                    for _ in 0..12 {
                        month = bb(month.next());
                    }
                    for _ in 0..12 {
                        month = bb(month.prev());
                    }
                    assert_eq!(month, start);
                })
            });
        }
    }
}

/// Measures the distance between months a few years apart.
fn month_distance(c: &mut Criterion) {
    const NAME: &str = "scroll/month_distance";

    for cached in [true, false] {
        let cal = calendar(CalendarKind::Hebrew, cached);
        let a = Month::from_date(date(2020, 1, 15), &cal);
        let b = Month::from_date(date(2025, 1, 15), &cal);
        let label = cache_label(cached);
        benchmark(c, format!("{NAME}/hebrew/{label}"), |bench| {
            bench.iter(|| {
                let n = bb(&a).distance(bb(&b));
                assert_eq!(n, 62);
            })
        });
    }
}

/// Measures looking up the day containing a date. This never uses the
/// cache, so it shows the cost of a call into the host calendar.
fn day_containing(c: &mut Criterion) {
    const NAME: &str = "scroll/day_from_date";

    let cal = calendar(CalendarKind::Gregorian, true);
    benchmark(c, format!("{NAME}/gregorian"), |b| {
        b.iter(|| {
            let day = Day::from_date(bb(date(2024, 2, 29)), &cal);
            assert_eq!(day.day(), 29);
        })
    });
}
