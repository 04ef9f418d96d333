use std::error::Error;
use std::fmt;

/// An error returned when waiting on a promise.
///
/// Every way a [`wait`] can come back without a value is represented here:
/// the promise was cancelled, the caller's own deadline ran out, or the
/// computation finished with an error of its own. A computation error is
/// passed through verbatim, not wrapped in extra context.
///
/// [`wait`]: crate::Promise::wait
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WaitError<E> {
    /// The promise was cancelled before it produced a result.
    ///
    /// This is returned both when the promise itself was [cancelled] and
    /// when the caller's [`StopToken`] fired first.
    ///
    /// [cancelled]: crate::Promise::cancel
    /// [`StopToken`]: crate::StopToken
    Cancelled,

    /// The caller's deadline elapsed before the promise settled.
    ///
    /// The computation keeps running; a later wait may still observe its
    /// eventual outcome.
    DeadlineExceeded,

    /// The computation itself returned an error.
    Failed(E),
}

impl<E: fmt::Display> fmt::Display for WaitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::Cancelled => "promise was cancelled".fmt(f),
            WaitError::DeadlineExceeded => "deadline has elapsed".fmt(f),
            WaitError::Failed(err) => err.fmt(f),
        }
    }
}

impl<E: Error + 'static> Error for WaitError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WaitError::Failed(err) => Some(err),
            _ => None,
        }
    }
}
