use jiff::{
    civil::{Date, Weekday},
    Timestamp,
};

use crate::{
    backing::{DayValue, FieldAccess},
    calendar::CalendarWrapper,
    fmt::{weekday_symbol, SymbolStyle},
    unit::{Body, CalendarUnit, Month, UnitImpl, Week, Year},
};

/// A day of some calendar.
///
/// A day starts at midnight in the calendar's time zone and ends at the
/// next midnight, so it is not always 24 hours long.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarKind, CalendarRegistry, CalendarUnit, Day};
/// use jiff::civil::{date, Weekday};
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::new(CalendarKind::Chinese));
///
/// // The Chinese year 4660 has a leap month after its second month.
/// let day = Day::from_date(date(2023, 4, 1), &cal);
/// assert_eq!(day.year(), 4660);
/// assert_eq!(day.month(), 2);
/// assert!(day.is_leap_month());
/// assert_eq!(day.day(), 11);
/// assert_eq!(day.weekday(), Weekday::Saturday);
/// assert!(day.is_weekend());
/// assert_eq!(day.to_string(), "4660-02L-11");
/// ```
#[derive(Clone)]
pub struct Day {
    calendar: CalendarWrapper,
    body: Body<DayValue>,
}

impl Day {
    /// Returns the current day of the given calendar.
    ///
    /// # Panics
    ///
    /// When the system clock reports a time outside of the range supported
    /// by the calendar.
    pub fn today(calendar: &CalendarWrapper) -> Day {
        Day::containing(Timestamp::now(), calendar)
    }

    /// Returns the day before the current day of the given calendar.
    ///
    /// # Panics
    ///
    /// Like [`Day::today`].
    pub fn yesterday(calendar: &CalendarWrapper) -> Day {
        Day::today(calendar).prev()
    }

    /// Returns the day after the current day of the given calendar.
    ///
    /// # Panics
    ///
    /// Like [`Day::today`].
    pub fn tomorrow(calendar: &CalendarWrapper) -> Day {
        Day::today(calendar).next()
    }

    /// Returns the code of this day's era in the host calendar, e.g.,
    /// `ce` or `reiwa`.
    pub fn era(&self) -> &'static str {
        self.calendar.kind().era_code(self.body.value.era())
    }

    /// Returns this day's year within its era.
    pub fn year(&self) -> i32 {
        self.body.value.year()
    }

    /// Returns the number of this day's month. A leap month has the number
    /// of the month it follows.
    pub fn month(&self) -> i32 {
        self.body.value.month().abs()
    }

    /// Returns true when this day falls in a leap month.
    pub fn is_leap_month(&self) -> bool {
        self.body.value.month() < 0
    }

    /// Returns this day's number within its month, starting at `1`.
    pub fn day(&self) -> i32 {
        self.body.value.day()
    }

    /// Returns the day of the week.
    pub fn weekday(&self) -> Weekday {
        self.body.start_date.weekday()
    }

    /// Returns the number of this day's weekday, where Sunday is `1` and
    /// Saturday is `7`.
    pub fn weekday_number(&self) -> i8 {
        self.weekday().to_sunday_one_offset()
    }

    /// Returns the English name of this day's weekday.
    pub fn weekday_symbol(&self, style: SymbolStyle) -> &'static str {
        weekday_symbol(self.weekday(), style)
    }

    /// Returns true when this day is a Saturday or a Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    /// Returns the number of the week containing this day within its year.
    /// See [`Week::week_of_year`].
    ///
    /// # Panics
    ///
    /// Like [`Day::containing_week`].
    pub fn week_of_year(&self) -> i32 {
        self.containing_week().week_of_year()
    }

    /// Returns the week containing this day.
    ///
    /// # Panics
    ///
    /// When the week extends beyond the supported range.
    pub fn containing_week(&self) -> Week {
        Week::from_date(self.body.start_date, &self.calendar)
    }

    /// Returns the month containing this day.
    ///
    /// # Panics
    ///
    /// When the month extends beyond the supported range.
    pub fn containing_month(&self) -> Month {
        Month::from_date(self.body.start_date, &self.calendar)
    }

    /// Returns the year containing this day.
    ///
    /// # Panics
    ///
    /// When the year extends beyond the supported range.
    pub fn containing_year(&self) -> Year {
        Year::from_date(self.body.start_date, &self.calendar)
    }
}

impl_calendar_unit!(Day);

impl UnitImpl for Day {
    type Value = DayValue;

    fn body(&self) -> &Body<DayValue> {
        &self.body
    }

    fn from_parts(calendar: CalendarWrapper, body: Body<DayValue>) -> Day {
        Day { calendar, body }
    }

    fn describe(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let formatter = self.calendar.formatter::<Day>(DAY_PATTERN);
        formatter.write(self.body.value.fields(), f)
    }
}

const DAY_PATTERN: &str = "%E%Y-%m-%d";

/// Writes the description of the day of `calendar` on the given civil date.
///
/// Dates the host calendar cannot describe are written in ISO 8601 format.
pub(super) fn describe_date(
    calendar: &CalendarWrapper,
    date: Date,
    f: &mut core::fmt::Formatter,
) -> core::fmt::Result {
    let Ok(fields) = calendar.context().host.fields(date) else {
        return core::fmt::Display::fmt(&date, f);
    };
    calendar.formatter::<Day>(DAY_PATTERN).write(fields, f)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use crate::{Calendar, CalendarKind, CalendarRegistry, DateInterval};

    use super::*;

    #[test]
    fn gregorian_fields() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let day = Day::from_date(date(2024, 2, 29), &cal);
        assert_eq!(day.era(), "ce");
        assert_eq!((day.year(), day.month(), day.day()), (2024, 2, 29));
        assert!(!day.is_leap_month());
        assert_eq!(day.weekday(), Weekday::Thursday);
        assert_eq!(day.weekday_number(), 5);
        assert_eq!(day.weekday_symbol(SymbolStyle::Short), "Thu");
        assert!(!day.is_weekend());
        assert_eq!(day.next().start_date(), date(2024, 3, 1));
        assert_eq!(day.containing_month().to_string(), "2024-02");
        assert_eq!(day.containing_year().to_string(), "2024");
        assert_eq!(day.week_of_year(), 9);
    }

    #[test]
    fn descriptions() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let day = Day::from_date(date(-43, 3, 15), &cal);
        insta::assert_snapshot!(day, @"bce 0044-03-15");

        let cal = registry.intern(Calendar::new(CalendarKind::Japanese));
        let day = Day::from_date(date(2019, 5, 1), &cal);
        insta::assert_snapshot!(day, @"reiwa 0001-05-01");
        insta::assert_snapshot!(day.prev(), @"heisei 0031-04-30");

        let cal = registry.intern(Calendar::new(CalendarKind::Hebrew));
        let day = Day::from_date(date(2024, 10, 3), &cal);
        insta::assert_snapshot!(day, @"5785-01-01");
    }

    #[test]
    fn debug_shows_value_and_calendar() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let day = Day::from_date(date(2024, 2, 5), &cal);
        insta::assert_snapshot!(format!("{day:?}"), @r#"Day { value: era 1, year 2024, month 2, day 5, calendar: CalendarWrapper { kind: Gregorian, time_zone: Some("UTC"), first_weekday: Monday, min_days_in_first_week: 4 } }"#);
    }

    #[test]
    fn days_in_time_zone_transitions() {
        let tz = jiff::tz::TimeZone::posix("EST5EDT,M3.2.0,M11.1.0").unwrap();
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian().time_zone(tz));
        let day = Day::from_date(date(2024, 3, 10), &cal);
        assert_eq!(day.duration(), jiff::SignedDuration::from_hours(23));
        let day = Day::from_date(date(2024, 11, 3), &cal);
        assert_eq!(day.duration(), jiff::SignedDuration::from_hours(25));
    }
}
