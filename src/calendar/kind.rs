use icu_calendar::AnyCalendarKind;

/// The calendar system used to interpret calendar units.
///
/// Every kind is backed by the corresponding calendar in ICU4X's
/// `icu_calendar` crate. Only calendars with a fixed, enumerated set of eras
/// are supported.
///
/// # Example
///
/// ```
/// use calunit::CalendarKind;
///
/// assert_eq!(CalendarKind::Chinese.name(), "chinese");
/// assert!(CalendarKind::Hebrew.is_lunisolar());
/// assert!(!CalendarKind::Gregorian.is_lunisolar());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum CalendarKind {
    /// The ISO 8601 calendar. It has a single era and uses astronomical
    /// year numbering.
    Iso,
    /// The proleptic Gregorian calendar with `bce` and `ce` eras.
    Gregorian,
    /// The Thai solar Buddhist calendar.
    Buddhist,
    /// The Japanese imperial calendar. Eras may begin on any day, which
    /// splits the surrounding Gregorian year and month into two units.
    Japanese,
    /// The Republic of China (Minguo) calendar.
    Roc,
    /// The Chinese lunisolar calendar.
    Chinese,
    /// The Korean lunisolar calendar.
    Dangi,
    /// The Hebrew lunisolar calendar.
    Hebrew,
    /// The Indian national (Saka) calendar.
    Indian,
    /// The Solar Hijri calendar.
    Persian,
}

/// The eras of each calendar kind, in chronological order.
///
/// The position of an era in its table is the era number stored in packed
/// backing values. Each entry lists the code used to construct dates first,
/// followed by aliases the host calendar may report.
static ISO_ERAS: &[&[&str]] = &[&["default", "iso"]];
static GREGORIAN_ERAS: &[&[&str]] = &[&["bce", "bc"], &["ce", "ad"]];
static BUDDHIST_ERAS: &[&[&str]] = &[&["be"]];
static JAPANESE_ERAS: &[&[&str]] = &[
    &["bce", "bc"],
    &["ce", "ad"],
    &["meiji"],
    &["taisho"],
    &["showa"],
    &["heisei"],
    &["reiwa"],
];
static ROC_ERAS: &[&[&str]] =
    &[&["roc-inverse", "minguo-qian"], &["roc", "minguo"]];
static CHINESE_ERAS: &[&[&str]] = &[&["chinese"]];
static DANGI_ERAS: &[&[&str]] = &[&["dangi"]];
static HEBREW_ERAS: &[&[&str]] = &[&["hebrew", "am"]];
static INDIAN_ERAS: &[&[&str]] = &[&["saka"]];
static PERSIAN_ERAS: &[&[&str]] = &[&["ah", "persian", "ap"]];

/// The average number of days in a synodic month.
const MEAN_LUNAR_MONTH_DAYS: f64 = 29.530_588;
/// The average number of days in a Gregorian month.
const MEAN_SOLAR_MONTH_DAYS: f64 = 30.436_875;
/// The average number of days in a Gregorian year. Lunisolar calendars keep
/// their years aligned with the solar year, so this holds for them too.
const MEAN_YEAR_DAYS: f64 = 365.2425;

impl CalendarKind {
    /// Every supported calendar kind.
    pub const ALL: &'static [CalendarKind] = &[
        CalendarKind::Iso,
        CalendarKind::Gregorian,
        CalendarKind::Buddhist,
        CalendarKind::Japanese,
        CalendarKind::Roc,
        CalendarKind::Chinese,
        CalendarKind::Dangi,
        CalendarKind::Hebrew,
        CalendarKind::Indian,
        CalendarKind::Persian,
    ];

    /// Returns a short lowercase name for this calendar kind.
    pub fn name(self) -> &'static str {
        match self {
            CalendarKind::Iso => "iso",
            CalendarKind::Gregorian => "gregorian",
            CalendarKind::Buddhist => "buddhist",
            CalendarKind::Japanese => "japanese",
            CalendarKind::Roc => "roc",
            CalendarKind::Chinese => "chinese",
            CalendarKind::Dangi => "dangi",
            CalendarKind::Hebrew => "hebrew",
            CalendarKind::Indian => "indian",
            CalendarKind::Persian => "persian",
        }
    }

    /// Returns true when months of this calendar follow the moon while its
    /// years follow the sun, which means some years have a leap month.
    pub fn is_lunisolar(self) -> bool {
        matches!(
            self,
            CalendarKind::Chinese | CalendarKind::Dangi | CalendarKind::Hebrew
        )
    }

    /// Returns true when the months of this calendar coincide with
    /// Gregorian months.
    pub fn has_gregorian_months(self) -> bool {
        matches!(
            self,
            CalendarKind::Iso
                | CalendarKind::Gregorian
                | CalendarKind::Buddhist
                | CalendarKind::Japanese
                | CalendarKind::Roc
        )
    }

    pub(crate) fn icu_kind(self) -> AnyCalendarKind {
        match self {
            CalendarKind::Iso => AnyCalendarKind::Iso,
            CalendarKind::Gregorian => AnyCalendarKind::Gregorian,
            CalendarKind::Buddhist => AnyCalendarKind::Buddhist,
            CalendarKind::Japanese => AnyCalendarKind::Japanese,
            CalendarKind::Roc => AnyCalendarKind::Roc,
            CalendarKind::Chinese => AnyCalendarKind::Chinese,
            CalendarKind::Dangi => AnyCalendarKind::Dangi,
            CalendarKind::Hebrew => AnyCalendarKind::Hebrew,
            CalendarKind::Indian => AnyCalendarKind::Indian,
            CalendarKind::Persian => AnyCalendarKind::Persian,
        }
    }

    fn era_table(self) -> &'static [&'static [&'static str]] {
        match self {
            CalendarKind::Iso => ISO_ERAS,
            CalendarKind::Gregorian => GREGORIAN_ERAS,
            CalendarKind::Buddhist => BUDDHIST_ERAS,
            CalendarKind::Japanese => JAPANESE_ERAS,
            CalendarKind::Roc => ROC_ERAS,
            CalendarKind::Chinese => CHINESE_ERAS,
            CalendarKind::Dangi => DANGI_ERAS,
            CalendarKind::Hebrew => HEBREW_ERAS,
            CalendarKind::Indian => INDIAN_ERAS,
            CalendarKind::Persian => PERSIAN_ERAS,
        }
    }

    /// Returns the number of eras this calendar kind can produce.
    pub(crate) fn era_count(self) -> usize {
        self.era_table().len()
    }

    /// Returns the canonical code of the era with the given number.
    ///
    /// # Panics
    ///
    /// When `era` is not a valid era number for this kind. Era numbers only
    /// come from `era_number`, so this indicates a bug.
    pub(crate) fn era_code(self, era: i32) -> &'static str {
        let index = usize::try_from(era).ok();
        match index.and_then(|i| self.era_table().get(i)) {
            Some(codes) => codes[0],
            None => panic!(
                "era number {era} is not valid for the {} calendar",
                self.name(),
            ),
        }
    }

    /// Returns the era number for an era code reported by the host calendar.
    pub(crate) fn era_number(self, code: &str) -> Option<i32> {
        let index = self
            .era_table()
            .iter()
            .position(|codes| codes.iter().any(|&c| c == code))?;
        // OK because era tables are tiny.
        Some(i32::try_from(index).unwrap())
    }

    /// Returns the era that is left out of rendered descriptions, if any.
    pub(crate) fn default_era(self) -> Option<i32> {
        let code = match self {
            CalendarKind::Japanese => return None,
            CalendarKind::Gregorian => "ce",
            CalendarKind::Roc => "roc",
            CalendarKind::Iso => "default",
            CalendarKind::Buddhist => "be",
            CalendarKind::Chinese => "chinese",
            CalendarKind::Dangi => "dangi",
            CalendarKind::Hebrew => "hebrew",
            CalendarKind::Indian => "saka",
            CalendarKind::Persian => "ah",
        };
        self.era_number(code)
    }

    /// Returns the codes of eras that may begin on any day of the year.
    ///
    /// The boundaries of all other eras coincide with the start of a year.
    pub(crate) fn regnal_eras(self) -> &'static [&'static str] {
        match self {
            CalendarKind::Japanese => {
                &["meiji", "taisho", "showa", "heisei", "reiwa"]
            }
            _ => &[],
        }
    }

    pub(crate) fn mean_month_days(self) -> f64 {
        if self.is_lunisolar() {
            MEAN_LUNAR_MONTH_DAYS
        } else {
            MEAN_SOLAR_MONTH_DAYS
        }
    }

    pub(crate) fn mean_year_days(self) -> f64 {
        MEAN_YEAR_DAYS
    }
}

impl core::fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for CalendarKind {
    fn arbitrary(g: &mut quickcheck::Gen) -> CalendarKind {
        // OK because `ALL` is not empty.
        *g.choose(CalendarKind::ALL).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn era_numbers_round_trip() {
        for &kind in CalendarKind::ALL {
            for era in 0..kind.era_count() {
                let era = i32::try_from(era).unwrap();
                let code = kind.era_code(era);
                assert_eq!(kind.era_number(code), Some(era), "{kind}");
            }
        }
    }

    #[test]
    fn era_aliases() {
        assert_eq!(CalendarKind::Gregorian.era_number("ad"), Some(1));
        assert_eq!(CalendarKind::Hebrew.era_number("am"), Some(0));
        assert_eq!(CalendarKind::Japanese.era_number("reiwa"), Some(6));
        assert_eq!(CalendarKind::Japanese.era_number("edo"), None);
    }

    #[test]
    fn default_eras() {
        assert_eq!(CalendarKind::Japanese.default_era(), None);
        for &kind in CalendarKind::ALL {
            if kind == CalendarKind::Japanese {
                continue;
            }
            assert!(kind.default_era().is_some(), "{kind}");
        }
    }

    #[test]
    #[should_panic(expected = "era number 2 is not valid")]
    fn bogus_era_number() {
        CalendarKind::Gregorian.era_code(2);
    }
}
