//! External cancellation of pending waits.
//!
//! A [`StopSource`] and its [`StopToken`]s let a caller abort waits it
//! started without touching the promises themselves. Passing a token to
//! [`Promise::wait`] makes that single wait return early with
//! [`WaitError::Cancelled`] once the source is stopped; the promise keeps
//! running.
//!
//! [`Promise::wait`]: crate::Promise::wait
//! [`WaitError::Cancelled`]: crate::WaitError::Cancelled

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::waker_list::WakerList;

struct Inner {
    stopped: AtomicBool,
    wakers: WakerList,
}

impl Inner {
    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.wakers.notify_all();
    }
}

/// A one-shot switch that stops every token issued from it.
///
/// Dropping the source has the same effect as calling [`stop`]; either way
/// the signal fires at most once.
///
/// [`stop`]: StopSource::stop
///
/// # Examples
///
/// ```
/// # async_std::task::block_on(async {
/// use std::time::Duration;
///
/// use async_promise::StopSource;
/// use async_std::task;
///
/// let source = StopSource::new();
/// let token = source.token();
///
/// task::spawn(async move {
///     task::sleep(Duration::from_millis(10)).await;
///     source.stop();
/// });
///
/// token.await;
/// # });
/// ```
pub struct StopSource {
    inner: Arc<Inner>,
}

impl StopSource {
    /// Creates a new source.
    pub fn new() -> StopSource {
        StopSource {
            inner: Arc::new(Inner {
                stopped: AtomicBool::new(false),
                wakers: WakerList::new(),
            }),
        }
    }

    /// Issues a token tied to this source.
    ///
    /// Any number of tokens can be issued; they all resolve when the source
    /// is stopped or dropped.
    pub fn token(&self) -> StopToken {
        StopToken {
            inner: self.inner.clone(),
            key: None,
        }
    }

    /// Stops every token issued by this source.
    pub fn stop(self) {
        // Dropping `self` fires the signal.
    }
}

impl Default for StopSource {
    fn default() -> StopSource {
        StopSource::new()
    }
}

impl Drop for StopSource {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl fmt::Debug for StopSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopSource {{ .. }}")
    }
}

/// A future that resolves once its [`StopSource`] is stopped or dropped.
///
/// Tokens are cheap to clone; each clone tracks the same source. A token can
/// be awaited directly or handed to [`Promise::wait`] as a deadline.
///
/// [`Promise::wait`]: crate::Promise::wait
pub struct StopToken {
    inner: Arc<Inner>,
    key: Option<usize>,
}

impl StopToken {
    /// Returns `true` if the source was already stopped or dropped.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    fn unpark(&mut self) {
        if let Some(key) = self.key.take() {
            self.inner.wakers.remove(key);
        }
    }
}

impl Clone for StopToken {
    fn clone(&self) -> StopToken {
        // The registration key belongs to the original; a clone parks itself
        // on its own first poll.
        StopToken {
            inner: self.inner.clone(),
            key: None,
        }
    }
}

impl Future for StopToken {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        if this.is_stopped() {
            this.unpark();
            return Poll::Ready(());
        }

        match this.key {
            None => this.key = Some(this.inner.wakers.insert(cx)),
            Some(key) => this.inner.wakers.update(key, cx),
        }

        // The source may have fired between the first check and the
        // registration above.
        if this.is_stopped() {
            this.unpark();
            return Poll::Ready(());
        }

        Poll::Pending
    }
}

impl Drop for StopToken {
    fn drop(&mut self) {
        self.unpark();
    }
}

impl fmt::Debug for StopToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopToken {{ .. }}")
    }
}
