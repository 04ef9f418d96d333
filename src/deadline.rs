use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_timer::Delay;

use crate::stop::StopToken;

/// A limit on how long a [`wait`] may block.
///
/// A deadline is either a timer, a [`StopToken`], or nothing at all. It is
/// consumed by a single [`wait`] call and only ever ends that one wait: the
/// promise behind it keeps running.
///
/// [`wait`]: crate::Promise::wait
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use async_promise::{Deadline, StopSource};
///
/// // Wait forever.
/// let unbounded = Deadline::never();
///
/// // Give up after 50 milliseconds.
/// let timed: Deadline = Duration::from_millis(50).into();
///
/// // Give up when the source is stopped.
/// let source = StopSource::new();
/// let stoppable: Deadline = source.token().into();
/// ```
pub struct Deadline(Inner);

enum Inner {
    Never,
    Timer(Delay),
    Token(StopToken),
}

/// The external event that cut a wait short.
pub(crate) enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

impl Deadline {
    /// A deadline that never fires: the wait only ends when the promise
    /// settles.
    pub fn never() -> Deadline {
        Deadline(Inner::Never)
    }

    /// Polls for the deadline's own event.
    ///
    /// A timer firing reports `DeadlineExceeded`; a stop token firing
    /// reports `Cancelled`.
    pub(crate) fn poll_interrupt(&mut self, cx: &mut Context<'_>) -> Poll<Interrupt> {
        match &mut self.0 {
            Inner::Never => Poll::Pending,
            Inner::Timer(delay) => Pin::new(delay)
                .poll(cx)
                .map(|_| Interrupt::DeadlineExceeded),
            Inner::Token(token) => Pin::new(token).poll(cx).map(|_| Interrupt::Cancelled),
        }
    }
}

impl Default for Deadline {
    fn default() -> Deadline {
        Deadline::never()
    }
}

impl From<Duration> for Deadline {
    fn from(dur: Duration) -> Deadline {
        Deadline(Inner::Timer(Delay::new(dur)))
    }
}

impl From<StopToken> for Deadline {
    fn from(token: StopToken) -> Deadline {
        Deadline(Inner::Token(token))
    }
}

impl fmt::Debug for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Never => write!(f, "Deadline::Never"),
            Inner::Timer(_) => write!(f, "Deadline::Timer {{ .. }}"),
            Inner::Token(_) => write!(f, "Deadline::Token {{ .. }}"),
        }
    }
}
