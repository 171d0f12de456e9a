use crate::error;

#[derive(Clone, Debug)]
pub(crate) enum Error {
    FailedAdvance { unit: &'static str, amount: i32 },
    FailedContaining { unit: &'static str },
    FailedCorrection { unit: &'static str, amount: i32 },
    FailedEnd { unit: &'static str },
}

impl From<Error> for error::Error {
    #[cold]
    #[inline(never)]
    fn from(err: Error) -> error::Error {
        error::ErrorKind::Unit(err).into()
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
            FailedAdvance { unit, amount } => {
                write!(f, "failed to advance {unit} by {amount}")
            }
            FailedContaining { unit } => write!(
                f,
                "failed to find the {unit} containing the given date",
            ),
            FailedCorrection { unit, amount } => write!(
                f,
                "estimate for advancing {unit} by {amount} \
                 did not converge",
            ),
            FailedEnd { unit } => {
                write!(f, "failed to find the end of {unit}")
            }
        }
    }
}
