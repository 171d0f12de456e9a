use std::{borrow::Cow, sync::Arc};

use jiff::{civil::Date, Timestamp};

use crate::{
    backing::{Backing, Context, FieldAccess, MonthValue, WeekValue, YearValue},
    calendar::{host::add_days, CalendarWrapper},
    error::Error,
    fmt::{month_code, month_symbol, SymbolStyle},
    unit::{
        compound::{impl_compound_unit, CompoundImpl},
        week::week_number,
        Body, CalendarUnit, UnitImpl, Week, Year,
    },
};

/// A month of some calendar.
///
/// A month is a compound unit of every week that overlaps it. Weeks are
/// indexed by their number within the month's year, counting the week that
/// contains the first day of the year as week `1`.
///
/// In calendars with regnal eras, a month during which a new era began is
/// split into two months: one ending the old era and one starting the new
/// era.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarKind, CalendarRegistry, CalendarUnit, Month};
/// use jiff::civil::date;
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::new(CalendarKind::Japanese));
///
/// let month = Month::from_date(date(2019, 4, 15), &cal);
/// assert_eq!(month.to_string(), "heisei 0031-04");
/// assert_eq!(month.next().to_string(), "reiwa 0001-05");
/// assert_eq!(month.next().start_date(), date(2019, 5, 1));
/// ```
#[derive(Clone)]
pub struct Month {
    calendar: CalendarWrapper,
    body: Body<MonthValue>,
}

impl Month {
    /// Returns the current month of the given calendar.
    ///
    /// # Panics
    ///
    /// When the system clock reports a time outside of the range supported
    /// by the calendar.
    pub fn current(calendar: &CalendarWrapper) -> Month {
        Month::containing(Timestamp::now(), calendar)
    }

    /// Returns the code of this month's era in the host calendar.
    pub fn era(&self) -> &'static str {
        self.calendar.kind().era_code(self.body.value.era())
    }

    /// Returns this month's year within its era.
    pub fn year(&self) -> i32 {
        self.body.value.year()
    }

    /// Returns the number of this month. A leap month has the number of
    /// the month it follows.
    pub fn month(&self) -> i32 {
        self.body.value.month().abs()
    }

    /// Returns true when this is a leap month.
    pub fn is_leap_month(&self) -> bool {
        self.body.value.month() < 0
    }

    /// Returns the year containing this month.
    ///
    /// # Panics
    ///
    /// When the year extends beyond the supported range.
    pub fn containing_year(&self) -> Year {
        Year::from_date(self.body.start_date, &self.calendar)
    }

    /// Returns the name of this month.
    ///
    /// Calendars whose months are Gregorian months use English month names.
    /// Every other calendar uses the host calendar's month code, e.g.,
    /// `M05L` for the leap month following the fifth month.
    ///
    /// # Example
    ///
    /// ```
    /// use calunit::{Calendar, CalendarKind, CalendarRegistry, CalendarUnit, Month, SymbolStyle};
    /// use jiff::civil::date;
    ///
    /// let registry = CalendarRegistry::new();
    /// let cal = registry.intern(Calendar::new(CalendarKind::Buddhist));
    /// let month = Month::from_date(date(2024, 9, 1), &cal);
    /// assert_eq!(month.symbol(SymbolStyle::Normal), "September");
    /// assert_eq!(month.symbol(SymbolStyle::Short), "Sep");
    ///
    /// let cal = registry.intern(Calendar::new(CalendarKind::Hebrew));
    /// let month = Month::from_date(date(2024, 3, 1), &cal);
    /// assert_eq!(month.symbol(SymbolStyle::Normal), "M05L");
    /// ```
    pub fn symbol(&self, style: SymbolStyle) -> Cow<'static, str> {
        let month = self.body.value.month();
        match month_symbol(self.calendar.kind(), month, style) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(month_code(month)),
        }
    }
}

impl_calendar_unit!(Month);
impl_compound_unit!(Month, Week);

impl UnitImpl for Month {
    type Value = MonthValue;

    fn body(&self) -> &Body<MonthValue> {
        &self.body
    }

    fn from_parts(calendar: CalendarWrapper, body: Body<MonthValue>) -> Month {
        Month { calendar, body }
    }

    fn subunits(
        start: Date,
        end: Date,
        cx: &Context<'_>,
    ) -> Result<Option<Arc<[i32]>>, Error> {
        let first = first_week_of_year(start, cx)?;
        let mut numbers = vec![];
        let mut week = WeekValue::start_of(start, cx)?;
        while week < end {
            numbers.push(week_number(first, week));
            week = add_days(week, 7)?;
        }
        Ok(Some(numbers.into()))
    }

    fn describe(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let formatter = self.calendar.formatter::<Month>("%E%Y-%m");
        formatter.write(self.body.value.fields(), f)
    }
}

impl CompoundImpl for Month {
    type Elem = Week;

    fn component_value(
        &self,
        element: &Week,
        cx: &Context<'_>,
    ) -> Result<i32, Error> {
        let first = first_week_of_year(self.body.start_date, cx)?;
        Ok(week_number(first, element.start_date()))
    }
}

/// Returns the first day of the week containing the first day of the year
/// containing `date`.
fn first_week_of_year(date: Date, cx: &Context<'_>) -> Result<Date, Error> {
    WeekValue::start_of(YearValue::start_of(date, cx)?, cx)
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, Weekday};

    use crate::{Calendar, CalendarKind, CalendarRegistry, CompoundUnit};

    use super::*;

    #[test]
    fn february_2024() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let feb = Month::from_date(date(2024, 2, 15), &cal);
        assert_eq!(feb.len(), 5);
        assert_eq!(feb.subunit_numbers(), [5, 6, 7, 8, 9]);
        assert_eq!(feb.next().to_string(), "2024-03");
        assert_eq!(feb.distance(&Month::from_date(date(2025, 2, 15), &cal)), 12);
        assert_eq!(feb.last().start_date(), date(2024, 2, 26));
        assert_eq!(feb.containing_year().to_string(), "2024");
    }

    #[test]
    fn weeks_shared_with_adjacent_months() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let jan = Month::from_date(date(2024, 1, 1), &cal);
        let feb = jan.next();
        let shared = jan.last();
        assert_eq!(shared, feb.first());
        assert_eq!(jan.index_of(&shared), Some(5));
        assert_eq!(feb.index_of(&shared), Some(5));
        let far = Week::from_date(date(2024, 6, 1), &cal);
        assert_eq!(feb.index_of(&far), None);
    }

    #[test]
    fn weeks_before_year_start() {
        // 2023-01-01 is a Sunday, so with weeks starting on Monday the first
        // week of 2023 starts in 2022.
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::gregorian());
        let jan = Month::from_date(date(2023, 1, 10), &cal);
        assert_eq!(jan.start_index(), 1);
        assert_eq!(jan.first().start_date(), date(2022, 12, 26));
        assert_eq!(jan.len(), 6);

        let cal =
            registry.intern(Calendar::gregorian().first_weekday(Weekday::Sunday));
        let jan = Month::from_date(date(2023, 1, 10), &cal);
        assert_eq!(jan.len(), 5);
        assert_eq!(jan.indices(), 1..6);
    }

    #[test]
    fn leap_months() {
        let registry = CalendarRegistry::new();
        let cal = registry.intern(Calendar::new(CalendarKind::Chinese));
        let leap = Month::from_date(date(2023, 4, 1), &cal);
        assert!(leap.is_leap_month());
        assert_eq!(leap.month(), 2);
        assert_eq!(leap.start_date(), date(2023, 3, 22));
        insta::assert_snapshot!(leap, @"4660-02L");
        insta::assert_snapshot!(leap.symbol(SymbolStyle::Normal), @"M02L");
        assert!(!leap.prev().is_leap_month());
        assert_eq!(leap.prev().month(), 2);
        assert_eq!(leap.next().month(), 3);
    }
}
