use std::sync::Arc;

pub(crate) mod host;
pub(crate) mod unit;

/// An error that can occur in this crate.
///
/// Most errors are a result of a calendar unit falling outside of the range
/// supported by either Jiff or the host calendar system. For example,
/// advancing a [`Month`](crate::Month) by a billion months will return an
/// error from [`CalendarUnit::checked_advanced`](crate::CalendarUnit::checked_advanced).
///
/// Programmer errors, like computing the distance between two units that
/// belong to different calendars, are not reported through this type. They
/// panic instead.
///
/// # Introspection is limited
///
/// Other than implementing the [`std::error::Error`] trait, the
/// [`core::fmt::Debug`] trait and the [`core::fmt::Display`] trait, this
/// error type currently provides very limited introspection capabilities.
/// Simple predicates like `Error::is_range` are provided, but the predicates
/// are not exhaustive.
///
/// # Design
///
/// Like Jiff, this crate uses a single error type for all of its fallible
/// operations. An error may carry a cause, in which case the `Display`
/// implementation prints the whole chain separated by `: `.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// This is in an `Arc` to make an `Error` cloneable and cheap to clone.
    /// It also keeps the size of an error equal to one word.
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// # Example
    ///
    /// ```
    /// use calunit::Error;
    ///
    /// let err = Error::from_args(format_args!("something failed"));
    /// assert_eq!(err.to_string(), "something failed");
    /// ```
    pub fn from_args<'a>(message: core::fmt::Arguments<'a>) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Returns true when this error originated as a result of a value being
    /// out of the supported range.
    ///
    /// This includes units that would need to start before `-9999-01-01`
    /// or after `9999-12-31`, which is the range supported by Jiff.
    ///
    /// # Example
    ///
    /// ```
    /// use calunit::{Calendar, CalendarRegistry, CalendarUnit, Year};
    ///
    /// let registry = CalendarRegistry::new();
    /// let cal = registry.intern(Calendar::gregorian());
    /// let year = Year::from_date(jiff::civil::date(2024, 1, 1), &cal);
    /// assert!(year.checked_advanced(1_000_000).unwrap_err().is_range());
    /// ```
    pub fn is_range(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Range(_))
    }

    /// Returns true when this error originated from the host calendar
    /// system rejecting or failing to produce a date.
    pub fn is_host_calendar(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Host(_))
    }
}

impl Error {
    /// Creates a new error indicating that a `given` value is out of the
    /// specified `min..=max` range. The given `what` label is used in the
    /// error message as a human readable description of what exactly is out
    /// of range. (e.g., "months")
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> Error {
        Error::from(ErrorKind::Range(RangeError::new(what, given, min, max)))
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        // OK because we always create the consequent right before attaching
        // a cause to it, so the `Arc` has exactly one reference.
        let inner = Arc::get_mut(&mut err.inner).unwrap();
        assert!(inner.cause.is_none(), "cause of consequence must be `None`");
        inner.cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        // OK because `Error::chain` is guaranteed to return a non-empty
        // iterator.
        self.chain().last().unwrap()
    }

    /// Returns a chain of error values, starting with the highest level
    /// context. The last error in the chain is always the root cause.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

/// The underlying kind of a [`Error`].
#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Host(self::host::Error),
    Jiff(jiff::Error),
    Range(RangeError),
    Unit(self::unit::Error),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match *self {
            Adhoc(ref msg) => msg.fmt(f),
            Host(ref err) => err.fmt(f),
            Jiff(ref err) => err.fmt(f),
            Range(ref err) => err.fmt(f),
            Unit(ref err) => err.fmt(f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }
}

impl From<jiff::Error> for Error {
    #[cold]
    #[inline(never)]
    fn from(err: jiff::Error) -> Error {
        ErrorKind::Jiff(err).into()
    }
}

/// A generic error message.
///
/// This is what `Error::from_args` and the crate internal `err!` macro
/// produce.
struct AdhocError {
    message: Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        let message = message.to_string().into_boxed_str();
        AdhocError { message }
    }
}

impl std::error::Error for AdhocError {}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error that occurs when an input value is out of bounds.
///
/// The error message produced by this type will include a name describing
/// which input was out of bounds, the value given and its minimum and maximum
/// allowed values.
#[derive(Debug)]
struct RangeError {
    what: &'static str,
    given: i128,
    min: i128,
    max: i128,
}

impl RangeError {
    fn new(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> RangeError {
        RangeError {
            what,
            given: given.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl std::error::Error for RangeError {}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, given, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {given} \
             is not in the required range of {min}..={max}",
        )
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This trait basically exists to make `Error::context` work without needing
/// to rely on public `From` impls.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for jiff::Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        Error::from(self)
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`.
/// Specifically, in the latter case, it absolves one of the need to call
/// `map_err` everywhere one wants to add context to an error.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}

/// Creates a new ad hoc error via `format_args!`.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::from_args(format_args!($($tt)*))
    }}
}

pub(crate) use err;

#[cfg(test)]
mod tests {
    use super::*;

    // We test that our 'Error' type is the size we expect. This isn't an API
    // guarantee, but if the size increases, we really want to make sure we
    // decide to do that intentionally.
    #[test]
    fn error_size() {
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn context_chain_display() {
        let err = Err::<(), _>(Error::range(
            "months",
            20_000_000,
            -120_000,
            120_000,
        ))
        .context(err!("failed to advance month"))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to advance month: parameter 'months' with value \
             20000000 is not in the required range of -120000..=120000",
        );
        assert!(err.is_range());
        assert!(!err.is_host_calendar());
    }
}
