/*!
Calendar configurations and the handles that interpret units against them.

A [`Calendar`] is a plain value describing how dates are grouped into units:
which calendar system to use, which time zone civil dates are interpreted
in, which weekday starts a week and how many days the first week of a year
needs. A [`CalendarWrapper`] is an identity-unique handle to one such
configuration, created by [`CalendarRegistry::intern`]. Every calendar unit
holds a wrapper, and all of the caching for units of that calendar lives
inside of it.
*/

use jiff::{civil::Weekday, tz::TimeZone};

use crate::error::Error;

pub use self::{
    kind::CalendarKind,
    registry::CalendarRegistry,
    wrapper::CalendarWrapper,
};

pub(crate) mod host;
mod kind;
mod registry;
mod wrapper;

/// A calendar configuration.
///
/// Two calendars are equal when all of their settings are equal. Equal
/// calendars interned into the same [`CalendarRegistry`] produce the same
/// [`CalendarWrapper`].
///
/// The default calendar is the Gregorian calendar in UTC with weeks that
/// follow ISO 8601: weeks start on Monday and the first week of a year is
/// the first one with at least 4 days in that year.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarKind};
/// use jiff::{civil::Weekday, tz::TimeZone};
///
/// let cal = Calendar::new(CalendarKind::Hebrew)
///     .time_zone(TimeZone::fixed(jiff::tz::offset(2)))
///     .first_weekday(Weekday::Sunday)
///     .min_days_in_first_week(1);
/// assert_eq!(cal.kind(), CalendarKind::Hebrew);
/// assert_eq!(cal.get_first_weekday(), Weekday::Sunday);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Calendar {
    kind: CalendarKind,
    time_zone: TimeZone,
    first_weekday: Weekday,
    min_days_in_first_week: i8,
}

impl Calendar {
    /// Creates a new calendar configuration for the given calendar system
    /// with the default settings.
    pub fn new(kind: CalendarKind) -> Calendar {
        Calendar {
            kind,
            time_zone: TimeZone::UTC,
            first_weekday: Weekday::Monday,
            min_days_in_first_week: 4,
        }
    }

    /// Creates a Gregorian calendar with the default settings.
    pub fn gregorian() -> Calendar {
        Calendar::new(CalendarKind::Gregorian)
    }

    /// Sets the time zone used to map instants to civil dates.
    pub fn time_zone(self, time_zone: TimeZone) -> Calendar {
        Calendar { time_zone, ..self }
    }

    /// Sets the weekday on which weeks begin.
    pub fn first_weekday(self, first_weekday: Weekday) -> Calendar {
        Calendar { first_weekday, ..self }
    }

    /// Sets the minimum number of days the first week of a year must have
    /// in that year.
    ///
    /// # Panics
    ///
    /// When `days` is not in the range `1..=7`. Use
    /// [`Calendar::try_min_days_in_first_week`] for a fallible version.
    pub fn min_days_in_first_week(self, days: i8) -> Calendar {
        match self.try_min_days_in_first_week(days) {
            Ok(cal) => cal,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`Calendar::min_days_in_first_week`], but returns an error when
    /// `days` is not in the range `1..=7`.
    pub fn try_min_days_in_first_week(
        self,
        days: i8,
    ) -> Result<Calendar, Error> {
        if !(1..=7).contains(&days) {
            return Err(Error::range("min_days_in_first_week", days, 1, 7));
        }
        Ok(Calendar { min_days_in_first_week: days, ..self })
    }

    /// Returns the calendar system of this configuration.
    pub fn kind(&self) -> CalendarKind {
        self.kind
    }

    /// Returns the time zone of this configuration.
    pub fn get_time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Returns the weekday on which weeks begin.
    pub fn get_first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// Returns the minimum number of days in the first week of a year.
    pub fn get_min_days_in_first_week(&self) -> i8 {
        self.min_days_in_first_week
    }
}

impl Default for Calendar {
    fn default() -> Calendar {
        Calendar::gregorian()
    }
}

/// Returns the number of days from the start of the week containing a day
/// with weekday `weekday` to that day.
pub(crate) fn days_into_week(weekday: Weekday, first: Weekday) -> i64 {
    let offset =
        weekday.to_monday_zero_offset() - first.to_monday_zero_offset();
    i64::from(offset.rem_euclid(7))
}

/// Returns the weekday `days` days after `weekday`.
pub(crate) fn weekday_after(weekday: Weekday, days: i64) -> Weekday {
    let offset = (i64::from(weekday.to_monday_zero_offset()) + days)
        .rem_euclid(7);
    // OK because the offset is in the range `0..7`.
    Weekday::from_monday_zero_offset(i8::try_from(offset).unwrap()).unwrap()
}
