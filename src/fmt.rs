/*!
Descriptions and symbols of calendar units.

Units render through a [`UnitFormatter`]: a pattern parsed once per unit
type and calendar and cached inside the calendar's wrapper. Patterns use a
small `strftime`-like syntax:

* `%E` is the era code followed by a space, or nothing for the default era
  of the calendar.
* `%Y` is the year, zero padded to at least four digits.
* `%m` is the month, zero padded to two digits, followed by `L` for leap
  months.
* `%d` is the day, zero padded to two digits.
* `%%` is a literal `%`.

Symbols are English names of weekdays and of months in calendars whose
months coincide with Gregorian months.
*/

use jiff::civil::Weekday;

use crate::{
    calendar::{host::Fields, CalendarKind},
    error::{err, Error},
};

/// The style of a weekday or month symbol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SymbolStyle {
    /// The full name, e.g., `Wednesday` or `February`.
    Normal,
    /// The abbreviated name, e.g., `Wed` or `Feb`.
    Short,
    /// A single letter, e.g., `W` or `F`.
    VeryShort,
}

static WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

static MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn styled(name: &'static str, style: SymbolStyle) -> &'static str {
    match style {
        SymbolStyle::Normal => name,
        SymbolStyle::Short => &name[..3],
        SymbolStyle::VeryShort => &name[..1],
    }
}

/// Returns the English symbol of a weekday.
///
/// # Example
///
/// ```
/// use calunit::{weekday_symbol, SymbolStyle};
/// use jiff::civil::Weekday;
///
/// assert_eq!(weekday_symbol(Weekday::Thursday, SymbolStyle::Normal), "Thursday");
/// assert_eq!(weekday_symbol(Weekday::Thursday, SymbolStyle::Short), "Thu");
/// assert_eq!(weekday_symbol(Weekday::Thursday, SymbolStyle::VeryShort), "T");
/// ```
pub fn weekday_symbol(weekday: Weekday, style: SymbolStyle) -> &'static str {
    let index = usize::try_from(weekday.to_monday_zero_offset()).unwrap();
    styled(WEEKDAYS[index], style)
}

/// Returns the English symbol of a month, for calendars whose months are
/// Gregorian months.
pub(crate) fn month_symbol(
    kind: CalendarKind,
    month: i32,
    style: SymbolStyle,
) -> Option<&'static str> {
    if !kind.has_gregorian_months() {
        return None;
    }
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTHS.get(index).map(|&name| styled(name, style))
}

/// Returns the host month code of a month number, e.g., `M05L` for the leap
/// month after the fifth month.
pub(crate) fn month_code(month: i32) -> String {
    if month < 0 {
        format!("M{:02}L", month.unsigned_abs())
    } else {
        format!("M{month:02}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Piece {
    Literal(Box<str>),
    Era,
    Year,
    Month,
    Day,
}

/// A parsed description pattern bound to one calendar kind.
#[derive(Debug)]
pub(crate) struct UnitFormatter {
    pieces: Vec<Piece>,
    default_era: Option<i32>,
    kind: CalendarKind,
}

impl UnitFormatter {
    /// Creates a formatter from one of this crate's built-in patterns.
    ///
    /// # Panics
    ///
    /// When the pattern is invalid. Patterns are constants of this crate, so
    /// this indicates a bug.
    pub(crate) fn new(kind: CalendarKind, pattern: &'static str) -> UnitFormatter {
        let pieces = match parse(pattern) {
            Ok(pieces) => pieces,
            Err(err) => panic!("invalid built-in pattern `{pattern}`: {err}"),
        };
        UnitFormatter { pieces, default_era: kind.default_era(), kind }
    }

    /// Writes the given fields according to this formatter's pattern.
    pub(crate) fn write(
        &self,
        fields: Fields,
        f: &mut dyn core::fmt::Write,
    ) -> core::fmt::Result {
        for piece in self.pieces.iter() {
            match *piece {
                Piece::Literal(ref lit) => f.write_str(lit)?,
                Piece::Era => {
                    if Some(fields.era) != self.default_era {
                        f.write_str(self.kind.era_code(fields.era))?;
                        f.write_str(" ")?;
                    }
                }
                Piece::Year => write!(f, "{:04}", fields.year)?,
                Piece::Month => {
                    write!(f, "{:02}", fields.month.unsigned_abs())?;
                    if fields.month < 0 {
                        f.write_str("L")?;
                    }
                }
                Piece::Day => write!(f, "{:02}", fields.day)?,
            }
        }
        Ok(())
    }
}

fn parse(pattern: &str) -> Result<Vec<Piece>, Error> {
    let mut pieces = vec![];
    let mut literal = String::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }
        let piece = match chars.next() {
            Some('%') => {
                literal.push('%');
                continue;
            }
            Some('E') => Piece::Era,
            Some('Y') => Piece::Year,
            Some('m') => Piece::Month,
            Some('d') => Piece::Day,
            Some(other) => {
                return Err(err!("unrecognized directive `%{other}`"))
            }
            None => return Err(err!("pattern ends with an incomplete `%`")),
        };
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal.into_boxed_str()));
            literal = String::new();
        }
        pieces.push(piece);
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal.into_boxed_str()));
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(kind: CalendarKind, pattern: &'static str, fields: Fields) -> String {
        let mut out = String::new();
        UnitFormatter::new(kind, pattern).write(fields, &mut out).unwrap();
        out
    }

    #[test]
    fn parse_patterns() {
        assert_eq!(
            parse("%E%Y-%m").unwrap(),
            vec![
                Piece::Era,
                Piece::Year,
                Piece::Literal("-".into()),
                Piece::Month
            ],
        );
        assert_eq!(
            parse("100%%").unwrap(),
            vec![Piece::Literal("100%".into())],
        );
        insta::assert_snapshot!(
            parse("%Q").unwrap_err(),
            @"unrecognized directive `%Q`",
        );
        insta::assert_snapshot!(
            parse("%").unwrap_err(),
            @"pattern ends with an incomplete `%`",
        );
    }

    #[test]
    fn render_fields() {
        let f = Fields { era: 1, year: 2024, month: 2, day: 5 };
        insta::assert_snapshot!(
            render(CalendarKind::Gregorian, "%E%Y-%m-%d", f),
            @"2024-02-05",
        );
        let f = Fields { era: 0, year: 44, month: 3, day: 15 };
        insta::assert_snapshot!(
            render(CalendarKind::Gregorian, "%E%Y-%m-%d", f),
            @"bce 0044-03-15",
        );
        let f = Fields { era: 6, year: 6, month: 2, day: 0 };
        insta::assert_snapshot!(
            render(CalendarKind::Japanese, "%E%Y-%m", f),
            @"reiwa 0006-02",
        );
        let f = Fields { era: 0, year: 4660, month: -2, day: 0 };
        insta::assert_snapshot!(
            render(CalendarKind::Chinese, "%E%Y-%m", f),
            @"4660-02L",
        );
    }

    #[test]
    fn symbols() {
        assert_eq!(weekday_symbol(Weekday::Sunday, SymbolStyle::Short), "Sun");
        assert_eq!(
            month_symbol(CalendarKind::Gregorian, 9, SymbolStyle::Normal),
            Some("September"),
        );
        assert_eq!(
            month_symbol(CalendarKind::Roc, 5, SymbolStyle::VeryShort),
            Some("M"),
        );
        assert_eq!(
            month_symbol(CalendarKind::Hebrew, 5, SymbolStyle::Normal),
            None,
        );
        assert_eq!(
            month_symbol(CalendarKind::Gregorian, 13, SymbolStyle::Normal),
            None,
        );
        assert_eq!(month_code(-5), "M05L");
        assert_eq!(month_code(11), "M11");
    }
}
