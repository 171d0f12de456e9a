use core::ops::Range;

use crate::{
    backing::{Backing, Context},
    cache::CompoundCache,
    error::Error,
    unit::{advanced, from_date, CalendarUnit, UnitImpl},
};

/// A calendar unit made up of an ordered sequence of smaller units.
///
/// A [`Year`](crate::Year) contains months, a [`Month`](crate::Month)
/// contains weeks and a [`Week`](crate::Week) contains days.
///
/// Subunits are addressed by *index*. The index of the first subunit is the
/// host calendar's number for it (see [`CompoundUnit::subunit_numbers`]),
/// and indices of later subunits follow contiguously. So index `3` of a
/// Gregorian year is March, index `1` of a week starting on Sunday is that
/// Sunday, and index `6` of February 2024 is the sixth week of 2024.
/// Zero-based *ordinals* are available through
/// [`CompoundUnit::ordinal`].
///
/// A month contains every week that overlaps it, so adjacent months share
/// weeks.
///
/// # Example
///
/// ```
/// use calunit::{Calendar, CalendarRegistry, CalendarUnit, CompoundUnit, Month};
/// use jiff::civil::date;
///
/// let registry = CalendarRegistry::new();
/// let cal = registry.intern(Calendar::gregorian());
///
/// let feb = Month::from_date(date(2024, 2, 15), &cal);
/// assert_eq!(feb.len(), 5);
/// assert_eq!(feb.indices(), 5..10);
///
/// let first = feb.first();
/// assert_eq!(first.start_date(), date(2024, 1, 29));
/// assert_eq!(feb.index_of(&first), Some(5));
/// assert_eq!(feb.element(9).start_date(), date(2024, 2, 26));
/// ```
pub trait CompoundUnit: CalendarUnit {
    /// The type of the subunits of this unit.
    type Element: CalendarUnit;

    /// Returns the host calendar numbers of every subunit, in order.
    ///
    /// For years, these are month numbers where leap months are negative.
    /// For months, these are week numbers counted from the week containing
    /// the first day of the month's year. For weeks, these are weekday
    /// numbers where Sunday is `1` and Saturday is `7`, in the order the
    /// days appear in the week. So they wrap around from `7` to `1` unless
    /// the week starts on Sunday, e.g., `[2, 3, 4, 5, 6, 7, 1]` for weeks
    /// starting on Monday. Leap months make the numbers of a year
    /// non-monotonic as well.
    fn subunit_numbers(&self) -> &[i32];

    /// Returns the subunit at the given index, or `None` when the index is
    /// out of range.
    ///
    /// # Errors
    ///
    /// When the subunit cannot be computed. Subunits lie within their unit,
    /// so this can only happen at the edges of the supported range.
    fn checked_get(&self, index: i32) -> Result<Option<Self::Element>, Error>;

    /// Returns the index of the given subunit, or `None` when it is not a
    /// subunit of this unit.
    ///
    /// # Panics
    ///
    /// When `element` belongs to a different calendar.
    fn index_of(&self, element: &Self::Element) -> Option<i32>;

    /// Returns the number of subunits.
    fn len(&self) -> usize {
        self.subunit_numbers().len()
    }

    /// Returns the index of the first subunit.
    fn start_index(&self) -> i32 {
        self.subunit_numbers()[0]
    }

    /// Returns the index after the last subunit.
    fn end_index(&self) -> i32 {
        // OK because units have at most a few dozen subunits.
        self.start_index() + i32::try_from(self.len()).unwrap()
    }

    /// Returns the range of valid indices.
    fn indices(&self) -> Range<i32> {
        self.start_index()..self.end_index()
    }

    /// Returns the index after the given one.
    fn index_after(&self, index: i32) -> i32 {
        index + 1
    }

    /// Returns the index before the given one.
    fn index_before(&self, index: i32) -> i32 {
        index - 1
    }

    /// Returns the subunit at the given index, or `None` when the index is
    /// out of range.
    ///
    /// # Panics
    ///
    /// When the subunit cannot be computed. See
    /// [`CompoundUnit::checked_get`].
    fn get(&self, index: i32) -> Option<Self::Element> {
        self.checked_get(index).unwrap_or_else(|err| {
            panic!("failed to compute subunit {index} of {self}: {err}")
        })
    }

    /// Returns the subunit at the given index.
    ///
    /// # Panics
    ///
    /// When the index is out of range.
    fn element(&self, index: i32) -> Self::Element {
        self.get(index).unwrap_or_else(|| {
            panic!(
                "index {index} is out of range {:?} for {self}",
                self.indices(),
            )
        })
    }

    /// Returns the subunit at the given zero-based position, or `None`
    /// when the position is out of range.
    fn get_ordinal(&self, ordinal: usize) -> Option<Self::Element> {
        let offset = i32::try_from(ordinal).ok()?;
        self.get(self.start_index().checked_add(offset)?)
    }

    /// Returns the subunit at the given zero-based position.
    ///
    /// # Panics
    ///
    /// When the position is out of range.
    fn ordinal(&self, ordinal: usize) -> Self::Element {
        self.get_ordinal(ordinal).unwrap_or_else(|| {
            panic!(
                "ordinal {ordinal} is out of range for {self} with {} \
                 subunits",
                self.len(),
            )
        })
    }

    /// Returns the first subunit.
    fn first(&self) -> Self::Element {
        self.ordinal(0)
    }

    /// Returns the last subunit.
    fn last(&self) -> Self::Element {
        self.ordinal(self.len() - 1)
    }

    /// Returns an iterator over all subunits, in order.
    fn iter(&self) -> Subunits<'_, Self> {
        Subunits { unit: self, indices: self.indices() }
    }
}

/// An iterator over the subunits of a compound unit.
///
/// This is created by [`CompoundUnit::iter`].
#[derive(Clone, Debug)]
pub struct Subunits<'a, U> {
    unit: &'a U,
    indices: Range<i32>,
}

impl<'a, U: CompoundUnit> Iterator for Subunits<'a, U> {
    type Item = U::Element;

    fn next(&mut self) -> Option<U::Element> {
        let index = self.indices.next()?;
        Some(self.unit.element(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'a, U: CompoundUnit> DoubleEndedIterator for Subunits<'a, U> {
    fn next_back(&mut self) -> Option<U::Element> {
        let index = self.indices.next_back()?;
        Some(self.unit.element(index))
    }
}

impl<'a, U: CompoundUnit> ExactSizeIterator for Subunits<'a, U> {}

impl<'a, U: CompoundUnit> core::iter::FusedIterator for Subunits<'a, U> {}

/// The internal interface of a compound unit type.
pub(crate) trait CompoundImpl: UnitImpl {
    type Elem: UnitImpl;

    /// Estimates the index of the given subunit of this unit from its host
    /// calendar fields.
    fn component_value(
        &self,
        element: &Self::Elem,
        cx: &Context<'_>,
    ) -> Result<i32, Error>;

    fn numbers(&self) -> &[i32] {
        // OK because compound units always compute their subunits.
        self.body().subunits.as_deref().unwrap()
    }
}

/// Implements `CompoundUnit` for a unit type in terms of its
/// `CompoundImpl`.
macro_rules! impl_compound_unit {
    ($ty:ident, $elem:ident) => {
        impl crate::unit::CompoundUnit for $ty {
            type Element = $elem;

            fn subunit_numbers(&self) -> &[i32] {
                crate::unit::compound::CompoundImpl::numbers(self)
            }

            fn checked_get(
                &self,
                index: i32,
            ) -> Result<Option<$elem>, crate::Error> {
                crate::unit::compound::element(self, index)
            }

            fn index_of(&self, element: &$elem) -> Option<i32> {
                crate::unit::compound::index_of(self, element).unwrap_or_else(
                    |err| {
                        panic!(
                            "failed to find {element} within {self}: {err}"
                        )
                    },
                )
            }
        }
    };
}

pub(crate) use impl_compound_unit;

fn index_range<U: CompoundImpl>(unit: &U) -> (i32, i32) {
    let numbers = unit.numbers();
    // OK because units have at most a few dozen subunits.
    let len = i32::try_from(numbers.len()).unwrap();
    (numbers[0], numbers[0] + len)
}

/// Returns the subunit at the given index.
///
/// The first subunit is the unit of the element type containing the first
/// day of `unit`. Every other subunit is found by advancing the first one.
pub(crate) fn element<U: CompoundImpl>(
    unit: &U,
    index: i32,
) -> Result<Option<U::Elem>, Error> {
    let (start, end) = index_range(unit);
    if !(start..end).contains(&index) {
        return Ok(None);
    }
    let calendar = unit.calendar();
    let body = unit.body();
    let cache = calendar.cache(CompoundCache::<
        U::Value,
        <U::Elem as UnitImpl>::Value,
    >::new);
    if let Some(elem) = cache.as_ref().and_then(|c| c.element(&body.value, index))
    {
        return Ok(Some(U::Elem::from_parts(calendar.clone(), elem)));
    }
    let first: U::Elem = from_date(body.start_date, calendar)?;
    let elem = advanced(&first, index - start)?;
    if let Some(cache) = cache {
        cache.record(&body.value, index, elem.body());
        calendar.purge_cache_if_needed();
    }
    Ok(Some(elem))
}

/// Returns the index of the given subunit.
///
/// The index is estimated from the subunit's host calendar fields and then
/// confirmed by stepping forward and then backward from the estimate.
pub(crate) fn index_of<U: CompoundImpl>(
    unit: &U,
    target: &U::Elem,
) -> Result<Option<i32>, Error> {
    let calendar = unit.calendar();
    calendar.assert_same(target.calendar(), U::Value::UNIT, "index lookup");
    let (body, elem) = (unit.body(), target.body());
    if elem.start_date >= body.end_date || elem.end_date <= body.start_date {
        return Ok(None);
    }
    let cache = calendar.cache(CompoundCache::<
        U::Value,
        <U::Elem as UnitImpl>::Value,
    >::new);
    if let Some(index) =
        cache.as_ref().and_then(|c| c.index(&body.value, &elem.value))
    {
        return Ok(Some(index));
    }
    let (start, end) = index_range(unit);
    let guess = {
        let cx = calendar.context();
        unit.component_value(target, &cx)?.clamp(start, end - 1)
    };
    for index in (guess..end).chain((start..guess).rev()) {
        let Some(candidate) = element(unit, index)? else { continue };
        if candidate != *target {
            continue;
        }
        if let Some(cache) = cache {
            cache.record(&body.value, index, elem);
            calendar.purge_cache_if_needed();
        }
        return Ok(Some(index));
    }
    trace!("{target} overlaps {unit} but is not one of its subunits");
    Ok(None)
}
