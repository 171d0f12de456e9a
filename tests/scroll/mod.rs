use calunit::{
    Calendar, CalendarKind, CalendarRegistry, CalendarUnit, CompoundUnit,
    DateInterval, Day, Month, Week, Year,
};
use jiff::civil::{date, Weekday};

/// Walks a month view the way a calendar screen does: the weeks of the
/// month, then the days of each week.
#[test]
fn month_view() -> crate::Result {
    let _ = crate::Logger::init();

    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let feb = Month::try_from_date(date(2024, 2, 15), &cal)?;

    assert_eq!(feb.len(), 5);
    assert_eq!(feb.subunit_numbers(), [5, 6, 7, 8, 9]);
    let first = feb.first();
    assert_eq!(first.start_date(), date(2024, 1, 29));
    assert_eq!(first.week_of_year(), 5);
    let last = feb.last();
    assert_eq!(last.end_date(), date(2024, 3, 4));

    let days: Vec<Day> = feb.iter().flat_map(|w| w.iter().collect::<Vec<_>>()).collect();
    assert_eq!(days.len(), 35);
    let in_month = days.iter().filter(|d| feb.contains_interval(*d)).count();
    assert_eq!(in_month, 29);
    assert!(days.windows(2).all(|w| w[0].next() == w[1]));

    let leap_day = Day::try_from_date(date(2024, 2, 29), &cal)?;
    assert_eq!(feb.index_of(&leap_day.containing_week()), Some(9));
    assert_eq!(leap_day.containing_month(), feb);
    Ok(())
}

#[test]
fn year_view() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let year = Year::try_from_date(date(2024, 8, 8), &cal)?;

    assert_eq!(year.ordinal(0).to_string(), "2024-01");
    assert_eq!(year.get(13), None);
    let months: Vec<String> = year.iter().rev().take(2).map(|m| m.to_string()).collect();
    assert_eq!(months, ["2024-12", "2024-11"]);
    assert_eq!(year.iter().len(), 12);
    assert_eq!(year.next().prev(), year);
    Ok(())
}

#[test]
fn scrolling_by_months() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let start = Month::try_from_date(date(2024, 1, 31), &cal)?;

    let mut month = start.clone();
    let mut seen = vec![];
    for _ in 0..14 {
        month = month.checked_advanced(1)?;
        seen.push(month.to_string());
    }
    assert_eq!(seen.first().map(String::as_str), Some("2024-02"));
    assert_eq!(seen.last().map(String::as_str), Some("2025-03"));
    assert_eq!(start.distance(&month), 14);
    assert_eq!(month.checked_advanced(-14)?, start);
    Ok(())
}

#[test]
fn chinese_leap_year() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::new(CalendarKind::Chinese));
    let year = Year::try_from_date(date(2023, 6, 1), &cal)?;

    assert_eq!(year.len(), 13);
    let leap: Vec<i32> =
        year.subunit_numbers().iter().copied().filter(|&m| m < 0).collect();
    assert_eq!(leap, [-2]);
    let leap_month = year.element(3);
    assert!(leap_month.is_leap_month());
    assert_eq!(leap_month.month(), 2);
    assert_eq!(leap_month.to_string(), "4660-02L");
    assert_eq!(year.index_of(&leap_month), Some(3));
    assert_eq!(year.index_of(&year.element(4)), Some(4));

    let next = year.next();
    assert_eq!(next.len(), 12);
    assert_eq!(year.distance(&next), 1);
    assert_eq!(year.first().distance(&next.first()), 13);
    Ok(())
}

#[test]
fn hebrew_leap_year() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::new(CalendarKind::Hebrew));
    let year = Year::try_from_date(date(2024, 1, 1), &cal)?;

    assert_eq!(year.year(), 5784);
    assert_eq!(year.len(), 13);
    let months: Vec<Month> = year.iter().collect();
    assert_eq!(months.iter().filter(|m| m.is_leap_month()).count(), 1);
    assert_eq!(year.prev().len(), 12);
    Ok(())
}

#[test]
fn weekdays() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry
        .intern(Calendar::gregorian().first_weekday(Weekday::Saturday));
    let week = Week::try_from_date(date(2024, 2, 15), &cal)?;

    assert_eq!(week.start_date(), date(2024, 2, 10));
    assert_eq!(week.subunit_numbers(), [7, 1, 2, 3, 4, 5, 6]);
    assert_eq!(week.indices(), 7..14);
    let days: Vec<Weekday> = week.iter().map(|d| d.weekday()).collect();
    assert_eq!(days.first(), Some(&Weekday::Saturday));
    assert_eq!(days.last(), Some(&Weekday::Friday));
    assert_eq!(cal.weekday_symbols(calunit::SymbolStyle::Short)[0], "Sat");
    Ok(())
}

#[test]
fn units_are_ordered_by_start() -> crate::Result {
    let registry = CalendarRegistry::new();
    let cal = registry.intern(Calendar::gregorian());
    let day = Day::try_from_date(date(2024, 2, 15), &cal)?;
    let mut days = vec![day.next(), day.prev(), day.clone()];
    days.sort();
    assert_eq!(days, [day.prev(), day.clone(), day.next()]);
    Ok(())
}

#[test]
#[should_panic(expected = "requires units of the same calendar")]
fn mixing_calendars_panics() {
    let registry = CalendarRegistry::new();
    let gregorian = registry.intern(Calendar::gregorian());
    let sunday = registry
        .intern(Calendar::gregorian().first_weekday(Weekday::Sunday));
    let month = Month::from_date(date(2024, 2, 1), &gregorian);
    let week = Week::from_date(date(2024, 2, 5), &sunday);
    month.index_of(&week);
}
