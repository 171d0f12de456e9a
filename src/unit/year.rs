use std::sync::Arc;

use jiff::{civil::Date, Timestamp};

use crate::{
    backing::{Backing, Context, FieldAccess, MonthValue, YearValue},
    calendar::CalendarWrapper,
    error::Error,
    unit::{
        compound::{impl_compound_unit, CompoundImpl},
        Body, CalendarUnit, Month, UnitImpl,
    },
};

/// A year of some calendar.
///
/// A year is a compound unit of months, indexed by month number. In
/// lunisolar calendars, a leap month takes the index after the month it
/// follows, so indices are positions rather than month numbers after a
/// leap month. See [`CompoundUnit::subunit_numbers`](crate::CompoundUnit::subunit_numbers)
/// for the actual month numbers.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarKind, CalendarRegistry, CalendarUnit, CompoundUnit, Year};
/// use jiff::civil::date;
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::new(CalendarKind::Chinese));
///
/// let year = Year::from_date(date(2023, 6, 1), &cal);
/// assert_eq!(year.len(), 13);
/// assert_eq!(year.subunit_numbers(), [1, 2, -2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
/// assert!(year.element(3).is_leap_month());
/// assert_eq!(year.start_date(), date(2023, 1, 22));
/// ```
#[derive(Clone)]
pub struct Year {
    calendar: CalendarWrapper,
    body: Body<YearValue>,
}

impl Year {
    /// Returns the current year of the given calendar.
    ///
    /// # Panics
    ///
    /// When the system clock reports a time outside of the range supported
    /// by the calendar.
    pub fn current(calendar: &CalendarWrapper) -> Year {
        Year::containing(Timestamp::now(), calendar)
    }

    /// Returns the code of this year's era in the host calendar.
    pub fn era(&self) -> &'static str {
        self.calendar.kind().era_code(self.body.value.era())
    }

    /// Returns the number of this year within its era.
    pub fn year(&self) -> i32 {
        self.body.value.year()
    }
}

impl_calendar_unit!(Year);
impl_compound_unit!(Year, Month);

impl UnitImpl for Year {
    type Value = YearValue;

    fn body(&self) -> &Body<YearValue> {
        &self.body
    }

    fn from_parts(calendar: CalendarWrapper, body: Body<YearValue>) -> Year {
        Year { calendar, body }
    }

    fn subunits(
        start: Date,
        end: Date,
        cx: &Context<'_>,
    ) -> Result<Option<Arc<[i32]>>, Error> {
        let mut numbers = vec![];
        let mut month = start;
        while month < end {
            numbers.push(cx.host.fields(month)?.month);
            month = MonthValue::next_start(month, cx)?;
        }
        Ok(Some(numbers.into()))
    }

    fn describe(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let formatter = self.calendar.formatter::<Year>("%E%Y");
        formatter.write(self.body.value.fields(), f)
    }
}

impl CompoundImpl for Year {
    type Elem = Month;

    fn component_value(
        &self,
        element: &Month,
        _cx: &Context<'_>,
    ) -> Result<i32, Error> {
        Ok(element.month())
    }
}
