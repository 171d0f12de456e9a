use crate::error;

#[derive(Debug)]
pub(crate) enum Error {
    EraNotFound { era: &'static str },
    FromCodes {
        era: &'static str,
        year: i32,
        month: i32,
        day: i32,
        err: icu_calendar::CalendarError,
    },
    UnknownEra { kind: &'static str, code: String },
    UnknownMonthCode { code: String },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Host(err).into()
    }
}

impl error::IntoError for Error {
    fn into_error(self) -> error::Error {
        self.into()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::Error::*;

        match *self {
            EraNotFound { era } => write!(
                f,
                "could not locate the first day of era `{era}` \
                 in the host calendar",
            ),
            FromCodes { era, year, month, day, ref err } => write!(
                f,
                "host calendar rejected era `{era}`, year {year}, \
                 month {month}, day {day}: {err}",
            ),
            UnknownEra { kind, ref code } => write!(
                f,
                "host calendar produced era `{code}`, which is not \
                 a known era of the {kind} calendar",
            ),
            UnknownMonthCode { ref code } => write!(
                f,
                "host calendar produced unrecognized month code `{code}`",
            ),
        }
    }
}
