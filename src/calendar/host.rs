/*!
Arithmetic on calendar units, delegated to ICU4X.

Everything in this module works on Jiff civil dates in the ISO calendar.
The host calendar is only consulted to learn the fields (era, year, month
and day) of an ISO date, the lengths of the host's months and years, and to
construct an ISO date from host fields.

A unit of a host calendar (a month or a year) is the maximal run of days
that share the same fields at that granularity. For most calendars the
first day of a unit is found through the host's day-of-month or day-of-year
counters. Calendars with regnal eras use Gregorian months and years, since
the host counts the days of a year from the start of its era. They
additionally split a unit wherever an era begins, so the first day of an
era is always the first day of a year and of a month.
*/

use icu_calendar::{
    types::{Era, MonthCode},
    AnyCalendar, Date as IcuDate, Iso, Ref,
};
use jiff::{civil::Date, SignedDuration};

use crate::{
    calendar::CalendarKind,
    convert::{ConvertInto, ConvertTryInto},
    error::{err, host, unit, Error, ErrorContext},
};

/// The largest number of days that can separate two Jiff civil dates.
const MAX_DAYS: i64 = 7_304_484;

/// The number of single-step corrections tolerated after estimating the
/// target of an advance.
const MAX_CORRECTIONS: usize = 64;

/// The fields of a date in a host calendar.
///
/// The month is the ordinal number encoded in the host's month code, negated
/// when the month is a leap month.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Fields {
    pub(crate) era: i32,
    pub(crate) year: i32,
    pub(crate) month: i32,
    pub(crate) day: i32,
}

/// The first day of an era that may begin in the middle of a year.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct EraStart {
    pub(crate) era: i32,
    pub(crate) date: Date,
}

/// The granularity of a month or year computation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Scale {
    Month,
    Year,
}

impl Scale {
    fn name(self) -> &'static str {
        match self {
            Scale::Month => "month",
            Scale::Year => "year",
        }
    }

    fn mean_days(self, kind: CalendarKind) -> f64 {
        match self {
            Scale::Month => kind.mean_month_days(),
            Scale::Year => kind.mean_year_days(),
        }
    }
}

/// A host calendar bound to one calendar kind.
///
/// This is created on demand for every computation. `AnyCalendar` is cheap
/// to construct from compiled data and is not shareable across threads, so
/// it is never stored.
pub(crate) struct Host<'a> {
    kind: CalendarKind,
    icu: AnyCalendar,
    era_starts: &'a [EraStart],
}

impl<'a> Host<'a> {
    pub(crate) fn new(kind: CalendarKind, era_starts: &'a [EraStart]) -> Host<'a> {
        Host { kind, icu: AnyCalendar::new(kind.icu_kind()), era_starts }
    }

    fn to_host(&self, date: Date) -> IcuDate<Ref<'_, AnyCalendar>> {
        let iso: IcuDate<Iso> = date.convert_into();
        iso.to_calendar(Ref(&self.icu))
    }

    /// Returns the host fields of the given ISO date.
    pub(crate) fn fields(&self, date: Date) -> Result<Fields, Error> {
        let d = self.to_host(date);
        let year = d.year();
        let era = self.kind.era_number(year.era.0.as_str()).ok_or_else(|| {
            host::Error::UnknownEra {
                kind: self.kind.name(),
                code: year.era.0.to_string(),
            }
        })?;
        let month = decode_month_code(d.month().code)?;
        // OK because days of a month always fit in an `i32`.
        let day = i32::try_from(d.day_of_month().0).unwrap();
        Ok(Fields { era, year: year.number, month, day })
    }

    /// Builds the ISO date for the given host fields.
    ///
    /// The host calendar may accept fields that do not round trip (for
    /// example, a day of an era before that era started). Callers verify the
    /// result with `Host::fields` when that matters.
    pub(crate) fn date_from_fields(
        &self,
        fields: Fields,
    ) -> Result<Date, Error> {
        let Fields { era, year, month, day } = fields;
        let era_code = self.kind.era_code(era);
        let icu_era = Era(era_code.parse().map_err(|_| {
            err!("era code `{era_code}` is not a valid host era")
        })?);
        let code = encode_month_code(month)?;
        let icu_day = u8::try_from(day)
            .map_err(|_| Error::range("day", day, 1, i32::from(u8::MAX)))?;
        let d = IcuDate::try_new_from_codes(
            icu_era,
            year,
            code,
            icu_day,
            Ref(&self.icu),
        )
        .map_err(|err| host::Error::FromCodes {
            era: era_code,
            year,
            month,
            day,
            err,
        })?;
        d.convert_try_into()
    }

    pub(crate) fn day_of_month(&self, date: Date) -> i64 {
        i64::from(self.to_host(date).day_of_month().0)
    }

    pub(crate) fn day_of_year(&self, date: Date) -> i64 {
        i64::from(self.to_host(date).day_of_year_info().day_of_year)
    }

    pub(crate) fn days_in_month(&self, date: Date) -> i64 {
        i64::from(self.to_host(date).days_in_month())
    }

    pub(crate) fn days_in_year(&self, date: Date) -> i64 {
        i64::from(self.to_host(date).days_in_year())
    }

    /// Returns true when units of this calendar are Gregorian months and
    /// years split at the start of each era.
    fn has_regnal_eras(&self) -> bool {
        !self.kind.regnal_eras().is_empty()
    }

    /// Returns the first day of the month or year containing `date`.
    pub(crate) fn start_of(
        &self,
        scale: Scale,
        date: Date,
    ) -> Result<Date, Error> {
        let first = if self.has_regnal_eras() {
            match scale {
                Scale::Month => date.first_of_month(),
                Scale::Year => date.first_of_year(),
            }
        } else {
            let offset = match scale {
                Scale::Month => self.day_of_month(date),
                Scale::Year => self.day_of_year(date),
            };
            add_days(date, 1 - offset)?
        };
        Ok(self
            .era_starts
            .iter()
            .map(|s| s.date)
            .filter(|&s| first < s && s <= date)
            .max()
            .unwrap_or(first))
    }

    /// Returns the first day of the month or year following the one that
    /// starts at `start`.
    pub(crate) fn next_start(
        &self,
        scale: Scale,
        start: Date,
    ) -> Result<Date, Error> {
        let next = if self.has_regnal_eras() {
            let last = match scale {
                Scale::Month => start.last_of_month(),
                Scale::Year => start.last_of_year(),
            };
            add_days(last, 1)?
        } else {
            let remaining = match scale {
                Scale::Month => {
                    self.days_in_month(start) - self.day_of_month(start) + 1
                }
                Scale::Year => {
                    self.days_in_year(start) - self.day_of_year(start) + 1
                }
            };
            add_days(start, remaining)?
        };
        Ok(self
            .era_starts
            .iter()
            .map(|s| s.date)
            .filter(|&s| start < s && s < next)
            .min()
            .unwrap_or(next))
    }

    /// Returns the first day of the month or year preceding the one that
    /// starts at `start`.
    pub(crate) fn prev_start(
        &self,
        scale: Scale,
        start: Date,
    ) -> Result<Date, Error> {
        self.start_of(scale, add_days(start, -1)?)
    }

    /// Returns the number of months or years from the unit starting at `a`
    /// to the unit starting at `b`.
    ///
    /// Without regnal eras, the boundaries of months and years never stray
    /// from a multiple of their mean length by more than a small fraction
    /// of a unit, so rounding the day difference is exact. With regnal
    /// eras, units are Gregorian months and years with an extra unit for
    /// every era that began in the middle of one.
    pub(crate) fn between(&self, scale: Scale, a: Date, b: Date) -> i64 {
        if self.era_starts.is_empty() {
            let days = days_between(a, b) as f64;
            return (days / scale.mean_days(self.kind)).round() as i64;
        }
        self.ordinal(scale, b) - self.ordinal(scale, a)
    }

    fn ordinal(&self, scale: Scale, start: Date) -> i64 {
        let (base, splits) = match scale {
            Scale::Month => (
                i64::from(start.year()) * 12 + i64::from(start.month()),
                self.era_starts
                    .iter()
                    .filter(|s| s.date <= start && s.date.day() != 1)
                    .count(),
            ),
            Scale::Year => (
                i64::from(start.year()),
                self.era_starts
                    .iter()
                    .filter(|s| {
                        s.date <= start
                            && (s.date.month(), s.date.day()) != (1, 1)
                    })
                    .count(),
            ),
        };
        // OK because there are only a handful of eras.
        base + i64::try_from(splits).unwrap()
    }

    /// Returns the first day of the unit `n` months or years away from the
    /// unit starting at `start`.
    pub(crate) fn advance(
        &self,
        scale: Scale,
        start: Date,
        n: i64,
    ) -> Result<Date, Error> {
        if n == 0 {
            return Ok(start);
        }
        if n.abs() <= 2 {
            let mut cur = start;
            for _ in 0..n.abs() {
                cur = if n > 0 {
                    self.next_start(scale, cur)?
                } else {
                    self.prev_start(scale, cur)?
                };
            }
            return Ok(cur);
        }
        let mean = scale.mean_days(self.kind);
        // Aim for the middle of the target unit so that small deviations
        // from the mean length still land inside of it.
        let guess = (n as f64 * mean + mean / 2.0).round() as i64;
        let mut cur = self.start_of(scale, add_days(start, guess)?)?;
        for step in 0..MAX_CORRECTIONS {
            let got = self.between(scale, start, cur);
            if got == n {
                if step > 1 {
                    debug!(
                        "advancing {} {} by {n} needed {step} corrections",
                        self.kind,
                        scale.name(),
                    );
                }
                return Ok(cur);
            }
            cur = if got < n {
                self.next_start(scale, cur)?
            } else {
                self.prev_start(scale, cur)?
            };
        }
        Err(Error::from(unit::Error::FailedCorrection {
            unit: scale.name(),
            // `n` always comes from an `i32`.
            amount: i32::try_from(n).unwrap_or(i32::MAX),
        }))
    }

    /// Finds the first day of every regnal era of this calendar kind.
    ///
    /// Eras that cannot be located are skipped with a warning. Units that
    /// would be split by such an era are then reported as one unit.
    pub(crate) fn find_era_starts(&self) -> Vec<EraStart> {
        let mut starts = vec![];
        for &code in self.kind.regnal_eras() {
            match self.find_era_start(code) {
                Ok(start) => {
                    trace!(
                        "{} era `{code}` starts on {}",
                        self.kind,
                        start.date,
                    );
                    starts.push(start);
                }
                Err(_err) => {
                    warn!(
                        "failed to locate start of {} era `{code}`: {_err}",
                        self.kind,
                    );
                }
            }
        }
        starts
    }

    fn find_era_start(&self, code: &'static str) -> Result<EraStart, Error> {
        let not_found = || host::Error::EraNotFound { era: code };
        let era = self.kind.era_number(code).ok_or_else(not_found)?;
        let mut hi = self.era_anchor(era).ok_or_else(not_found)?;
        // Every regnal era starts at most two years before its anchor.
        let mut lo = add_days(hi, -800)?;
        if self.fields(lo)?.era >= era {
            return Err(Error::from(not_found()));
        }
        // Eras are numbered chronologically, so we can bisect.
        while days_between(lo, hi) > 1 {
            let mid = add_days(lo, days_between(lo, hi) / 2)?;
            if self.fields(mid)?.era >= era {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(EraStart { era, date: hi })
    }

    /// Returns some date known to be in the given era, near its start.
    fn era_anchor(&self, era: i32) -> Option<Date> {
        for year in 1..=2 {
            for month in 1..=12 {
                let fields = Fields { era, year, month, day: 1 };
                let Ok(date) = self.date_from_fields(fields) else { continue };
                if self.fields(date).ok()?.era == era {
                    return Some(date);
                }
            }
        }
        None
    }
}

/// Adds the given number of days to a civil date.
pub(crate) fn add_days(date: Date, days: i64) -> Result<Date, Error> {
    let range = || Error::range("days", days, -MAX_DAYS, MAX_DAYS);
    if !(-MAX_DAYS..=MAX_DAYS).contains(&days) {
        return Err(range());
    }
    date.checked_add(SignedDuration::from_hours(days * 24))
        .map_err(|_| range())
}

/// Returns the number of days from `a` to `b`.
pub(crate) fn days_between(a: Date, b: Date) -> i64 {
    a.duration_until(b).as_hours() / 24
}

/// Decodes a host month code like `M05` or `M05L` into a month number that
/// is negative for leap months.
fn decode_month_code(code: MonthCode) -> Result<i32, Error> {
    let unknown = || host::Error::UnknownMonthCode {
        code: code.0.as_str().to_string(),
    };
    let bytes = code.0.as_str().as_bytes();
    let (digits, leap) = match bytes {
        [b'M', digits @ .., b'L'] => (digits, true),
        [b'M', digits @ ..] => (digits, false),
        _ => return Err(Error::from(unknown())),
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(Error::from(unknown()));
    }
    let number = digits
        .iter()
        .fold(0i32, |acc, &b| acc * 10 + i32::from(b - b'0'));
    Ok(if leap { -number } else { number })
}

/// The inverse of `decode_month_code`.
fn encode_month_code(month: i32) -> Result<MonthCode, Error> {
    if month == 0 || month.abs() > 99 {
        return Err(Error::range("month", month, -99, 99));
    }
    let code = if month < 0 {
        format!("M{:02}L", -month)
    } else {
        format!("M{month:02}")
    };
    let parsed = code
        .parse()
        .map_err(|_| err!("`{code}` is not a valid host month code"));
    Ok(MonthCode(parsed.context(err!("invalid month {month}"))?))
}
