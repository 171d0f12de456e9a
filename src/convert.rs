/*!
Conversions between Jiff's civil dates and ICU4X's ISO dates.

These mirror the `From`/`TryFrom` traits from the standard library. They
exist because neither `jiff` nor `icu_calendar` is defined in this crate, so
the orphan rules forbid implementing `From` between their types here.
*/

use icu_calendar::{AsCalendar as IcuAsCalendar, Date as IcuDate, Iso};
use jiff::civil::Date as JiffDate;

use crate::error::{err, Error};

/// Adds infallible conversions between crates that mirrors [`From`].
pub(crate) trait ConvertFrom<F>: Sized {
    /// Infallibly converts a value of type `F` to a value of type `Self`.
    fn convert_from(value: F) -> Self;
}

/// Adds infallible conversions between crates that mirrors [`Into`].
pub(crate) trait ConvertInto<T>: Sized {
    /// Infallibly converts a value of type `Self` to a value of type `T`.
    fn convert_into(self) -> T;
}

/// Adds fallible conversions between crates that mirrors [`TryFrom`].
pub(crate) trait ConvertTryFrom<F>: Sized {
    /// Fallibly converts a value of type `F` to a value of type `Self`.
    fn convert_try_from(value: F) -> Result<Self, Error>;
}

/// Adds fallible conversions between crates that mirrors [`TryInto`].
pub(crate) trait ConvertTryInto<T>: Sized {
    /// Fallibly converts a value of type `Self` to a value of type `T`.
    fn convert_try_into(self) -> Result<T, Error>;
}

impl<F, T: ConvertFrom<F>> ConvertInto<T> for F {
    fn convert_into(self) -> T {
        T::convert_from(self)
    }
}

impl<F, T: ConvertTryFrom<F>> ConvertTryInto<T> for F {
    fn convert_try_into(self) -> Result<T, Error> {
        T::convert_try_from(self)
    }
}

/// Converts a date in any host calendar to a Jiff civil date by way of the
/// ISO calendar. This fails when the date is outside of Jiff's supported
/// range.
impl<C: IcuAsCalendar> ConvertTryFrom<IcuDate<C>> for JiffDate {
    fn convert_try_from(v: IcuDate<C>) -> Result<JiffDate, Error> {
        let v = v.to_iso();
        let year = v.year().number;
        let (min, max) = (JiffDate::MIN.year(), JiffDate::MAX.year());
        if !(i32::from(min)..=i32::from(max)).contains(&year) {
            return Err(Error::range("year", year, min, max));
        }
        // OK because we just checked that `year` is within Jiff's range.
        let year = i16::try_from(year).unwrap();

        let month = v.month().ordinal;
        let month = i8::try_from(month).map_err(|_| {
            err!("failed to convert host month of {month} to `i8`")
        })?;

        let day = v.day_of_month().0;
        let day = i8::try_from(day).map_err(|_| {
            err!("failed to convert host day of {day} to `i8`")
        })?;
        Ok(JiffDate::new(year, month, day)?)
    }
}

impl ConvertFrom<JiffDate> for IcuDate<Iso> {
    fn convert_from(v: JiffDate) -> IcuDate<Iso> {
        let year = i32::from(v.year());
        let month = v.month().unsigned_abs();
        let day = v.day().unsigned_abs();
        // All Jiff civil dates are valid ICU4X dates.
        IcuDate::try_new_iso_date(year, month, day).unwrap()
    }
}
