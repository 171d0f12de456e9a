/*!
Intervals of time.

A [`DateInterval`] is anything with a start and an end instant. Every
calendar unit is a date interval, and so are ranges of
[`Timestamp`]s. This makes it possible to ask, e.g., whether a month
contains some instant or some arbitrary range of instants.
*/

use core::ops::{Range, RangeInclusive};

use jiff::{SignedDuration, Timestamp};

/// A span of time from a start instant up to, but not including, an end
/// instant.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarRegistry, CalendarUnit, DateInterval, Day, Month};
/// use jiff::civil::date;
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::gregorian());
///
/// let feb = Month::from_date(date(2024, 2, 1), &cal);
/// let leap_day = Day::from_date(date(2024, 2, 29), &cal);
/// assert!(feb.contains_interval(&leap_day));
/// assert!(!feb.contains(feb.end()));
///
/// let mar = feb.next();
/// let both = feb.start()..mar.end();
/// assert_eq!(both.clamped(&mar), mar.start()..mar.end());
/// ```
pub trait DateInterval {
    /// Returns the first instant of this interval.
    fn start(&self) -> Timestamp;

    /// Returns the first instant after this interval.
    fn end(&self) -> Timestamp;

    /// Returns the time from the start to the end of this interval.
    ///
    /// This is zero or negative for empty intervals.
    fn duration(&self) -> SignedDuration {
        self.start().duration_until(self.end())
    }

    /// Returns true when this interval contains no instants.
    fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }

    /// Returns true when this interval contains the given instant.
    fn contains(&self, timestamp: Timestamp) -> bool {
        self.start() <= timestamp && timestamp < self.end()
    }

    /// Returns true when this interval contains every instant of `other`.
    ///
    /// Every interval contains an empty interval starting within it.
    fn contains_interval<I: DateInterval + ?Sized>(&self, other: &I) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Returns true when this interval and `other` share at least one
    /// instant.
    fn overlaps<I: DateInterval + ?Sized>(&self, other: &I) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    /// Returns the part of this interval within `bounds`.
    ///
    /// When the intervals do not overlap, this returns an empty range at
    /// whichever end of `bounds` is closest to this interval.
    fn clamped<I: DateInterval + ?Sized>(&self, bounds: &I) -> Range<Timestamp> {
        let (lo, hi) = (bounds.start(), bounds.end().max(bounds.start()));
        let start = self.start().clamp(lo, hi);
        let end = self.end().clamp(start, hi);
        start..end
    }
}

impl DateInterval for Range<Timestamp> {
    fn start(&self) -> Timestamp {
        self.start
    }

    fn end(&self) -> Timestamp {
        self.end
    }
}

/// An inclusive range of instants ends one nanosecond after its last
/// instant, except when it ends at [`Timestamp::MAX`].
impl DateInterval for RangeInclusive<Timestamp> {
    fn start(&self) -> Timestamp {
        *RangeInclusive::start(self)
    }

    fn end(&self) -> Timestamp {
        let last = *RangeInclusive::end(self);
        last.checked_add(SignedDuration::from_nanos(1)).unwrap_or(last)
    }

    fn contains(&self, timestamp: Timestamp) -> bool {
        RangeInclusive::contains(self, &timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    #[test]
    fn half_open_ranges() {
        let r = ts(10)..ts(20);
        // `Range` has an inherent `contains` taking a reference.
        assert!(DateInterval::contains(&r, ts(10)));
        assert!(!DateInterval::contains(&r, ts(20)));
        assert_eq!(DateInterval::duration(&r), SignedDuration::from_secs(10));
        assert!(r.contains_interval(&(ts(12)..ts(20))));
        assert!(!r.contains_interval(&(ts(12)..ts(21))));
        assert!(r.overlaps(&(ts(19)..ts(30))));
        assert!(!r.overlaps(&(ts(20)..ts(30))));
    }

    #[test]
    fn inclusive_ranges() {
        let r = ts(10)..=ts(20);
        assert!(DateInterval::contains(&r, ts(20)));
        assert_eq!(
            DateInterval::end(&r),
            ts(20) + SignedDuration::from_nanos(1),
        );
        let max = ts(0)..=Timestamp::MAX;
        assert!(DateInterval::contains(&max, Timestamp::MAX));
    }

    #[test]
    fn clamping() {
        let bounds = ts(10)..ts(20);
        assert_eq!((ts(5)..ts(15)).clamped(&bounds), ts(10)..ts(15));
        assert_eq!((ts(12)..ts(18)).clamped(&bounds), ts(12)..ts(18));
        assert_eq!((ts(0)..ts(5)).clamped(&bounds), ts(10)..ts(10));
        assert_eq!((ts(25)..ts(30)).clamped(&bounds), ts(20)..ts(20));
        assert!((ts(25)..ts(30)).clamped(&bounds).is_empty());
    }
}
