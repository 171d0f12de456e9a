/*!
Compact values that identify a calendar unit within its calendar.

A backing value is what a unit *is*: two units of the same calendar are
equal exactly when their backing values are equal. Day, month and year
values store host calendar fields (era number, year, month and day) packed
into a single `u64`. The bit layout is picked once per calendar from the
number of eras it has. Fields that do not fit the layout are stored boxed at
full width instead, so packing never loses information.

Leap months are stored as negative month numbers.

Week values store the civil date of the first day of the week, since a week
is not described by host calendar fields.

Backing values never refer to their calendar. Everything that needs the
calendar receives it through a [`Context`].
*/

use jiff::civil::Date;

use crate::{
    calendar::{
        days_into_week,
        host::{add_days, days_between, Fields, Host, Scale},
        Calendar,
    },
    error::{err, Error},
};

/// Everything a backing value needs to know about its calendar.
pub(crate) struct Context<'a> {
    pub(crate) host: Host<'a>,
    pub(crate) layout: Layout,
    pub(crate) calendar: &'a Calendar,
}

/// The strategy used to pack fields into a `u64`.
///
/// From the most significant bit: a 2 bit layout tag, the era, the year
/// (two's complement), the month and the day (both 8 bit two's complement).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Layout {
    /// Up to 256 eras with 38 bit years.
    Compact,
    /// Up to 2^20 eras with 26 bit years.
    Extended,
}

const TAG_BITS: u32 = 2;
const MONTH_BITS: u32 = 8;
const DAY_BITS: u32 = 8;

impl Layout {
    /// Picks the layout for a calendar with `count` eras.
    ///
    /// # Panics
    ///
    /// When the era numbers need more than 20 bits. No supported calendar
    /// comes anywhere close, so this indicates an unsupported configuration.
    pub(crate) fn for_era_count(count: usize) -> Layout {
        let bits = usize::BITS - count.saturating_sub(1).leading_zeros();
        if bits <= Layout::Compact.era_bits() {
            Layout::Compact
        } else if bits <= Layout::Extended.era_bits() {
            Layout::Extended
        } else {
            panic!(
                "calendars with {count} eras need {bits} bits for era \
                 numbers, but at most {} are supported",
                Layout::Extended.era_bits(),
            )
        }
    }

    fn tag(self) -> u64 {
        match self {
            Layout::Compact => 0,
            Layout::Extended => 1,
        }
    }

    fn from_tag(tag: u64) -> Layout {
        match tag {
            0 => Layout::Compact,
            1 => Layout::Extended,
            _ => unreachable!("invalid packed layout tag {tag}"),
        }
    }

    fn era_bits(self) -> u32 {
        match self {
            Layout::Compact => 8,
            Layout::Extended => 20,
        }
    }

    fn year_bits(self) -> u32 {
        64 - TAG_BITS - self.era_bits() - MONTH_BITS - DAY_BITS
    }
}

/// Read access to the fields of a backing value, regardless of how they
/// are stored.
pub(crate) trait FieldAccess {
    fn era(&self) -> i32;
    fn year(&self) -> i32;
    fn month(&self) -> i32;
    fn day(&self) -> i32;

    fn fields(&self) -> Fields {
        Fields {
            era: self.era(),
            year: self.year(),
            month: self.month(),
            day: self.day(),
        }
    }
}

impl FieldAccess for Fields {
    fn era(&self) -> i32 {
        self.era
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn month(&self) -> i32 {
        self.month
    }

    fn day(&self) -> i32 {
        self.day
    }
}

/// Fields packed into a single word.
#[derive(Clone, Copy)]
struct Packed(u64);

impl Packed {
    fn new(layout: Layout, fields: Fields) -> Option<Packed> {
        let era = u64::try_from(fields.era).ok()?;
        if era >= 1 << layout.era_bits() {
            return None;
        }
        let year = pack_signed(fields.year.into(), layout.year_bits())?;
        let month = pack_signed(fields.month.into(), MONTH_BITS)?;
        let day = pack_signed(fields.day.into(), DAY_BITS)?;

        let mut bits = layout.tag();
        bits = (bits << layout.era_bits()) | era;
        bits = (bits << layout.year_bits()) | year;
        bits = (bits << MONTH_BITS) | month;
        bits = (bits << DAY_BITS) | day;
        Some(Packed(bits))
    }

    fn layout(&self) -> Layout {
        Layout::from_tag(self.0 >> (64 - TAG_BITS))
    }

    fn field(&self, shift: u32, bits: u32) -> u64 {
        (self.0 >> shift) & ((1 << bits) - 1)
    }
}

impl FieldAccess for Packed {
    fn era(&self) -> i32 {
        let layout = self.layout();
        let shift = layout.year_bits() + MONTH_BITS + DAY_BITS;
        // OK because eras use at most 20 bits.
        i32::try_from(self.field(shift, layout.era_bits())).unwrap()
    }

    fn year(&self) -> i32 {
        let bits = self.layout().year_bits();
        let year = unpack_signed(self.field(MONTH_BITS + DAY_BITS, bits), bits);
        // OK because packing only accepts years that came from an `i32`.
        i32::try_from(year).unwrap()
    }

    fn month(&self) -> i32 {
        let month = unpack_signed(self.field(DAY_BITS, MONTH_BITS), MONTH_BITS);
        // OK because the month is 8 bits.
        i32::try_from(month).unwrap()
    }

    fn day(&self) -> i32 {
        let day = unpack_signed(self.field(0, DAY_BITS), DAY_BITS);
        // OK because the day is 8 bits.
        i32::try_from(day).unwrap()
    }
}

fn pack_signed(value: i64, bits: u32) -> Option<u64> {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;
    if !(min..=max).contains(&value) {
        return None;
    }
    Some((value as u64) & ((1 << bits) - 1))
}

fn unpack_signed(raw: u64, bits: u32) -> i64 {
    ((raw << (64 - bits)) as i64) >> (64 - bits)
}

/// The storage of a day, month or year value.
#[derive(Clone)]
enum Storage {
    Packed(Packed),
    Boxed(Box<Fields>),
}

impl Storage {
    fn new(layout: Layout, fields: Fields) -> Storage {
        match Packed::new(layout, fields) {
            Some(packed) => Storage::Packed(packed),
            None => Storage::Boxed(Box::new(fields)),
        }
    }

    fn get(&self) -> Fields {
        match *self {
            Storage::Packed(ref packed) => packed.fields(),
            Storage::Boxed(ref fields) => **fields,
        }
    }
}

impl Eq for Storage {}

impl PartialEq for Storage {
    fn eq(&self, other: &Storage) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for Storage {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state);
    }
}

/// The contract shared by all backing values.
///
/// Apart from converting between values and dates, arithmetic works on the
/// civil start dates of units. Units carry their start date, so navigating
/// never needs to recompute it from the fields of a value.
pub(crate) trait Backing:
    Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync + 'static
{
    /// A lowercase human readable name of the unit, e.g., `month`.
    const UNIT: &'static str;

    /// Returns the value of the unit containing the given date.
    fn from_date(date: Date, cx: &Context<'_>) -> Result<Self, Error>;

    /// Computes the first day of the unit identified by this value.
    fn start_date(&self, cx: &Context<'_>) -> Result<Date, Error>;

    /// Returns the first day of the unit containing the given date.
    fn start_of(date: Date, cx: &Context<'_>) -> Result<Date, Error>;

    /// Returns the first day of the unit after the one starting at `start`.
    fn next_start(start: Date, cx: &Context<'_>) -> Result<Date, Error>;

    /// Returns the first day of the unit `n` units after the one starting
    /// at `start`.
    fn advance_start(
        start: Date,
        n: i64,
        cx: &Context<'_>,
    ) -> Result<Date, Error>;

    /// Returns the number of units between the units starting at `a` and
    /// `b`.
    fn starts_between(a: Date, b: Date, cx: &Context<'_>) -> i64;
}

/// The backing value of a day: era, year, month and day.
#[derive(Clone, Eq, Hash, PartialEq)]
pub(crate) struct DayValue(Storage);

/// The backing value of a month: era, year and month.
#[derive(Clone, Eq, Hash, PartialEq)]
pub(crate) struct MonthValue(Storage);

/// The backing value of a year: era and year.
#[derive(Clone, Eq, Hash, PartialEq)]
pub(crate) struct YearValue(Storage);

/// The backing value of a week: its first day.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct WeekValue(pub(crate) Date);

impl DayValue {
    pub(crate) fn new(layout: Layout, fields: Fields) -> DayValue {
        DayValue(Storage::new(layout, fields))
    }
}

impl MonthValue {
    pub(crate) fn new(layout: Layout, era: i32, year: i32, month: i32) -> MonthValue {
        MonthValue(Storage::new(layout, Fields { era, year, month, day: 0 }))
    }
}

impl YearValue {
    pub(crate) fn new(layout: Layout, era: i32, year: i32) -> YearValue {
        YearValue(Storage::new(layout, Fields { era, year, month: 0, day: 0 }))
    }
}

macro_rules! impl_field_access {
    ($ty:ty) => {
        impl FieldAccess for $ty {
            fn era(&self) -> i32 {
                self.0.get().era
            }

            fn year(&self) -> i32 {
                self.0.get().year
            }

            fn month(&self) -> i32 {
                self.0.get().month
            }

            fn day(&self) -> i32 {
                self.0.get().day
            }

            fn fields(&self) -> Fields {
                self.0.get()
            }
        }
    };
}

impl_field_access!(DayValue);
impl_field_access!(MonthValue);
impl_field_access!(YearValue);

impl core::fmt::Debug for DayValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let Fields { era, year, month, day } = self.fields();
        write!(f, "era {era}, year {year}, month {month}, day {day}")
    }
}

impl core::fmt::Debug for MonthValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let Fields { era, year, month, .. } = self.fields();
        write!(f, "era {era}, year {year}, month {month}")
    }
}

impl core::fmt::Debug for YearValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let Fields { era, year, .. } = self.fields();
        write!(f, "era {era}, year {year}")
    }
}

/// Returns true when the given date has the same fields as `want` for all
/// fields that `want` sets.
fn matches(date: Date, want: Fields, cx: &Context<'_>) -> Result<bool, Error> {
    let got = cx.host.fields(date)?;
    Ok(got.era == want.era
        && got.year == want.year
        && (want.month == 0 || got.month == want.month)
        && (want.day == 0 || got.day == want.day))
}

impl Backing for DayValue {
    const UNIT: &'static str = "day";

    fn from_date(date: Date, cx: &Context<'_>) -> Result<DayValue, Error> {
        Ok(DayValue::new(cx.layout, cx.host.fields(date)?))
    }

    fn start_date(&self, cx: &Context<'_>) -> Result<Date, Error> {
        let want = self.fields();
        let date = cx.host.date_from_fields(want)?;
        if !matches(date, want, cx)? {
            return Err(err!("host calendar has no day {self:?}"));
        }
        Ok(date)
    }

    fn start_of(date: Date, _: &Context<'_>) -> Result<Date, Error> {
        Ok(date)
    }

    fn next_start(start: Date, _: &Context<'_>) -> Result<Date, Error> {
        add_days(start, 1)
    }

    fn advance_start(
        start: Date,
        n: i64,
        _: &Context<'_>,
    ) -> Result<Date, Error> {
        add_days(start, n)
    }

    fn starts_between(a: Date, b: Date, _: &Context<'_>) -> i64 {
        days_between(a, b)
    }
}

impl Backing for WeekValue {
    const UNIT: &'static str = "week";

    fn from_date(date: Date, cx: &Context<'_>) -> Result<WeekValue, Error> {
        Ok(WeekValue(WeekValue::start_of(date, cx)?))
    }

    fn start_date(&self, _: &Context<'_>) -> Result<Date, Error> {
        Ok(self.0)
    }

    fn start_of(date: Date, cx: &Context<'_>) -> Result<Date, Error> {
        let first = cx.calendar.get_first_weekday();
        add_days(date, -days_into_week(date.weekday(), first))
    }

    fn next_start(start: Date, _: &Context<'_>) -> Result<Date, Error> {
        add_days(start, 7)
    }

    fn advance_start(
        start: Date,
        n: i64,
        _: &Context<'_>,
    ) -> Result<Date, Error> {
        let days = n.checked_mul(7).ok_or_else(|| {
            Error::range("weeks", n, i64::MIN / 7, i64::MAX / 7)
        })?;
        add_days(start, days)
    }

    fn starts_between(a: Date, b: Date, _: &Context<'_>) -> i64 {
        days_between(a, b).div_euclid(7)
    }
}

impl Backing for MonthValue {
    const UNIT: &'static str = "month";

    fn from_date(date: Date, cx: &Context<'_>) -> Result<MonthValue, Error> {
        let f = cx.host.fields(date)?;
        Ok(MonthValue::new(cx.layout, f.era, f.year, f.month))
    }

    fn start_date(&self, cx: &Context<'_>) -> Result<Date, Error> {
        let want = self.fields();
        // The first day of a month may not exist when an era began in the
        // middle of it, so try successive days until one round trips.
        for day in 1..=31 {
            let Ok(date) = cx.host.date_from_fields(Fields { day, ..want })
            else {
                continue;
            };
            if matches(date, want, cx)? {
                return cx.host.start_of(Scale::Month, date);
            }
        }
        Err(err!("host calendar has no month {self:?}"))
    }

    fn start_of(date: Date, cx: &Context<'_>) -> Result<Date, Error> {
        cx.host.start_of(Scale::Month, date)
    }

    fn next_start(start: Date, cx: &Context<'_>) -> Result<Date, Error> {
        cx.host.next_start(Scale::Month, start)
    }

    fn advance_start(
        start: Date,
        n: i64,
        cx: &Context<'_>,
    ) -> Result<Date, Error> {
        cx.host.advance(Scale::Month, start, n)
    }

    fn starts_between(a: Date, b: Date, cx: &Context<'_>) -> i64 {
        cx.host.between(Scale::Month, a, b)
    }
}

impl Backing for YearValue {
    const UNIT: &'static str = "year";

    fn from_date(date: Date, cx: &Context<'_>) -> Result<YearValue, Error> {
        let f = cx.host.fields(date)?;
        Ok(YearValue::new(cx.layout, f.era, f.year))
    }

    fn start_date(&self, cx: &Context<'_>) -> Result<Date, Error> {
        let want = self.fields();
        // A year cut short by the start of an era may lack its first months.
        for month in 1..=13 {
            let fields = Fields { month, day: 1, ..want };
            let Ok(date) = cx.host.date_from_fields(fields) else { continue };
            if matches(date, want, cx)? {
                return cx.host.start_of(Scale::Year, date);
            }
        }
        Err(err!("host calendar has no year {self:?}"))
    }

    fn start_of(date: Date, cx: &Context<'_>) -> Result<Date, Error> {
        cx.host.start_of(Scale::Year, date)
    }

    fn next_start(start: Date, cx: &Context<'_>) -> Result<Date, Error> {
        cx.host.next_start(Scale::Year, start)
    }

    fn advance_start(
        start: Date,
        n: i64,
        cx: &Context<'_>,
    ) -> Result<Date, Error> {
        cx.host.advance(Scale::Year, start, n)
    }

    fn starts_between(a: Date, b: Date, cx: &Context<'_>) -> i64 {
        cx.host.between(Scale::Year, a, b)
    }
}
