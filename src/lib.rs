/*!
Calendar units (days, weeks, months and years) of arbitrary calendars, with
cached navigation and subunit indexing.

This crate models the units a calendar user interface scrolls through. Each
unit is an immutable, hashable value tied to one calendar configuration. It
can be advanced, compared with other units of its calendar and, for weeks,
months and years, indexed by its subunits. Calendar arithmetic is delegated
to [ICU4X](https://docs.rs/icu_calendar/1/) through a small adapter, so the
host calendar's rules for leap years, leap months and eras are
authoritative. Instants, civil dates and time zones come from [`jiff`].

Since navigating a calendar tends to revisit the same units over and over,
distances, advances and subunit lookups are cached per calendar. Caches are
bounded and purged by usage. See [`CacheConfig`].

# Overview

* A [`Calendar`] is a calendar configuration: a [`CalendarKind`], a time
  zone, the first day of the week and the minimum number of days in the
  first week of a year.
* A [`CalendarRegistry`] interns calendars into [`CalendarWrapper`]s. Two
  equal calendars interned by one registry share one wrapper, and with it
  one set of caches.
* [`Day`], [`Week`], [`Month`] and [`Year`] are units of a calendar. They
  implement [`CalendarUnit`] and [`DateInterval`]. Weeks, months and years
  also implement [`CompoundUnit`].

# Example

This shows how to walk through the weeks of a month, and how months of a
lunisolar calendar differ from Gregorian months:

```
use calunit::{
    Calendar, CalendarKind, CalendarRegistry, CalendarUnit, CompoundUnit,
    Month, Year,
};
use jiff::civil::date;

let registry = CalendarRegistry::new();
let gregorian = registry.intern(Calendar::gregorian());

let feb = Month::from_date(date(2024, 2, 15), &gregorian);
let weeks: Vec<String> = feb.iter().map(|w| w.to_string()).collect();
assert_eq!(weeks, [
    "2024-01-29..2024-02-04",
    "2024-02-05..2024-02-11",
    "2024-02-12..2024-02-18",
    "2024-02-19..2024-02-25",
    "2024-02-26..2024-03-03",
]);

let chinese = registry.intern(Calendar::new(CalendarKind::Chinese));
let year = Year::from_date(date(2023, 6, 1), &chinese);
assert_eq!(year.len(), 13);
assert_eq!(year.to_string(), "4660");
```

# Crate features

* **logging** - When enabled, the `log` crate is used to emit messages about
  calendar creation, era detection and cache purges. This is meant for
  debugging and is disabled by default.
*/

#![deny(rustdoc::broken_intra_doc_links)]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

pub use crate::{
    cache::CacheConfig,
    calendar::{Calendar, CalendarKind, CalendarRegistry, CalendarWrapper},
    error::Error,
    fmt::{weekday_symbol, SymbolStyle},
    interval::DateInterval,
    unit::{CalendarUnit, CompoundUnit, Day, Month, Subunits, Week, Year},
};

#[macro_use]
mod logging;

mod backing;
mod cache;
mod calendar;
mod convert;
mod error;
mod fmt;
mod interval;
mod unit;
