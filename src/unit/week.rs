use std::sync::Arc;

use jiff::{civil::Date, Timestamp};

use crate::{
    backing::{Backing, Context, WeekValue, YearValue},
    calendar::{
        host::{add_days, days_between},
        weekday_after, CalendarWrapper,
    },
    error::Error,
    unit::{
        compound::{impl_compound_unit, CompoundImpl},
        day::describe_date,
        Body, CalendarUnit, Day, UnitImpl,
    },
};

/// A week of some calendar.
///
/// Weeks start on the calendar's
/// [first weekday](crate::Calendar::first_weekday). A week is a compound
/// unit of days, indexed by weekday number where Sunday is `1` and Saturday
/// is `7`. Indices continue past `7` when the week starts after Sunday.
///
/// [`CompoundUnit::subunit_numbers`](crate::CompoundUnit::subunit_numbers)
/// returns the weekday numbers in display order, so they are not sorted
/// unless the week starts on Sunday.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarRegistry, CalendarUnit, CompoundUnit, Week};
/// use jiff::civil::{date, Weekday};
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::gregorian());
///
/// let week = Week::from_date(date(2024, 2, 15), &cal);
/// assert_eq!(week.to_string(), "2024-02-12..2024-02-18");
/// assert_eq!(week.subunit_numbers(), [2, 3, 4, 5, 6, 7, 1]);
/// // Sunday comes last, after Saturday.
/// assert_eq!(week.element(8).weekday(), Weekday::Sunday);
/// assert_eq!(week.week_of_year(), 7);
/// ```
#[derive(Clone)]
pub struct Week {
    calendar: CalendarWrapper,
    body: Body<WeekValue>,
}

impl Week {
    /// Returns the current week of the given calendar.
    ///
    /// # Panics
    ///
    /// When the system clock reports a time outside of the range supported
    /// by the calendar.
    pub fn current(calendar: &CalendarWrapper) -> Week {
        Week::containing(Timestamp::now(), calendar)
    }

    /// Returns the number of this week within its year, starting at `1`.
    ///
    /// A week belongs to the year containing at least
    /// [`min_days_in_first_week`](crate::Calendar::min_days_in_first_week)
    /// of its days, so the first days of a year may be in the last week of
    /// the previous year. With the default configuration (weeks start on
    /// Monday and need 4 days) this is the ISO 8601 week number for
    /// Gregorian calendars.
    ///
    /// # Panics
    ///
    /// When the year this week belongs to extends beyond the supported
    /// range.
    pub fn week_of_year(&self) -> i32 {
        self.try_week_of_year().unwrap_or_else(|err| {
            panic!("failed to number the week {self}: {err}")
        })
    }

    fn try_week_of_year(&self) -> Result<i32, Error> {
        let cx = self.calendar.context();
        let min = i64::from(cx.calendar.get_min_days_in_first_week());
        let start = self.body.start_date;
        // The last `min` days of a week are in the year owning it.
        let owner = add_days(start, 7 - min)?;
        let year_start = YearValue::start_of(owner, &cx)?;
        let first = WeekValue::start_of(add_days(year_start, min - 1)?, &cx)?;
        Ok(week_number(first, start))
    }
}

impl_calendar_unit!(Week);
impl_compound_unit!(Week, Day);

impl UnitImpl for Week {
    type Value = WeekValue;

    fn body(&self) -> &Body<WeekValue> {
        &self.body
    }

    fn from_parts(calendar: CalendarWrapper, body: Body<WeekValue>) -> Week {
        Week { calendar, body }
    }

    fn subunits(
        _start: Date,
        _end: Date,
        cx: &Context<'_>,
    ) -> Result<Option<Arc<[i32]>>, Error> {
        let first = cx.calendar.get_first_weekday();
        let numbers = (0..7)
            .map(|i| i32::from(weekday_after(first, i).to_sunday_one_offset()))
            .collect();
        Ok(Some(numbers))
    }

    fn describe(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        describe_date(&self.calendar, self.body.start_date, f)?;
        f.write_str("..")?;
        match add_days(self.body.end_date, -1) {
            Ok(last) => describe_date(&self.calendar, last, f),
            Err(_) => core::fmt::Display::fmt(&self.body.end_date, f),
        }
    }
}

impl CompoundImpl for Week {
    type Elem = Day;

    fn component_value(
        &self,
        element: &Day,
        _cx: &Context<'_>,
    ) -> Result<i32, Error> {
        let number = i32::from(element.weekday_number());
        let first = self.numbers()[0];
        Ok(if number < first { number + 7 } else { number })
    }
}

/// Returns the number of the week starting at `start`, counting the week
/// starting at `first` as week `1`.
pub(super) fn week_number(first: Date, start: Date) -> i32 {
    // OK because there are fewer than `i32::MAX` weeks between any two
    // civil dates.
    i32::try_from(days_between(first, start).div_euclid(7) + 1).unwrap()
}
