use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_channel::oneshot;
use kv_log_macro::trace;
use log::log_enabled;

use crate::deadline::{Deadline, Interrupt};
use crate::error::WaitError;
use crate::id::PromiseId;
use crate::state::{State, StateCell};
use crate::waker_list::WakerList;

/// A handle to an eagerly started computation.
///
/// The computation begins running when the promise is created with
/// [`spawn`] or [`spawn_blocking`] and settles exactly once: with a value,
/// with the computation's own error, or as cancelled. Observers read the
/// settled outcome through [`wait`] and [`try_wait`]; all of them, however
/// many and however late, see the same result.
///
/// Dropping the handle detaches the computation: it still runs to
/// completion and settles, there is just no one left to look.
///
/// [`spawn`]: fn.spawn.html
/// [`spawn_blocking`]: fn.spawn_blocking.html
/// [`wait`]: #method.wait
/// [`try_wait`]: #method.try_wait
///
/// # Examples
///
/// ```
/// # async_std::task::block_on(async {
/// use async_promise::Deadline;
///
/// let promise = async_promise::spawn(async { Ok::<_, ()>("hello") });
/// assert_eq!(promise.wait(Deadline::never()).await, Ok("hello"));
/// assert!(promise.is_done());
/// # });
/// ```
pub struct Promise<T, E> {
    shared: Arc<Shared<T, E>>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

/// The single terminal event of a promise.
pub(crate) enum Outcome<T, E> {
    Value(T),
    Error(E),
    Cancelled,
}

impl<T: Clone, E: Clone> Outcome<T, E> {
    fn to_result(&self) -> Result<T, WaitError<E>> {
        match self {
            Outcome::Value(value) => Ok(value.clone()),
            Outcome::Error(err) => Err(WaitError::Failed(err.clone())),
            Outcome::Cancelled => Err(WaitError::Cancelled),
        }
    }
}

/// State shared between the handle, its observers, and the supervisor task.
pub(crate) struct Shared<T, E> {
    id: PromiseId,
    state: StateCell,
    outcome: Mutex<Option<Outcome<T, E>>>,
    wakers: WakerList,
}

impl<T, E> Shared<T, E> {
    pub(crate) fn new(id: PromiseId) -> Shared<T, E> {
        Shared {
            id,
            state: StateCell::new(),
            outcome: Mutex::new(None),
            wakers: WakerList::new(),
        }
    }

    /// Publishes the one and only terminal event.
    ///
    /// Called exactly once, by the supervisor task. The outcome is written
    /// before the state flips so that a terminal state always implies a
    /// readable outcome.
    pub(crate) fn settle(&self, outcome: Outcome<T, E>) {
        let terminal = match outcome {
            Outcome::Cancelled => State::Cancelled,
            _ => State::Done,
        };

        *self.outcome.lock().unwrap() = Some(outcome);

        let settled = self.state.try_settle(terminal);
        debug_assert!(settled, "a promise settled twice");

        if log_enabled!(log::Level::Trace) {
            trace!("settled", { promise_id: self.id.0 });
        }

        self.wakers.notify_all();
    }

    fn read(&self) -> Option<Result<T, WaitError<E>>>
    where
        T: Clone,
        E: Clone,
    {
        self.outcome.lock().unwrap().as_ref().map(Outcome::to_result)
    }
}

impl<T, E> Promise<T, E> {
    pub(crate) fn new(shared: Arc<Shared<T, E>>, cancel: oneshot::Sender<()>) -> Promise<T, E> {
        Promise {
            shared,
            cancel: Mutex::new(Some(cancel)),
        }
    }

    /// Returns the id assigned to this promise at spawn time.
    pub fn id(&self) -> PromiseId {
        self.shared.id
    }

    /// Returns `true` once the promise has settled.
    ///
    /// A cancelled promise counts as done.
    ///
    /// # Examples
    ///
    /// ```
    /// # async_std::task::block_on(async {
    /// use std::time::Duration;
    ///
    /// use async_promise::Deadline;
    /// use async_std::task;
    ///
    /// let promise = async_promise::spawn(async {
    ///     task::sleep(Duration::from_millis(50)).await;
    ///     Ok::<_, ()>(())
    /// });
    ///
    /// assert!(!promise.is_done());
    /// promise.wait(Deadline::never()).await.unwrap();
    /// assert!(promise.is_done());
    /// # });
    /// ```
    pub fn is_done(&self) -> bool {
        self.shared.state.load() != State::Pending
    }

    /// Returns `true` if the promise settled as cancelled.
    ///
    /// This only reports cancellation that actually won the race against
    /// the computation. A [`cancel`] call that arrives after the promise
    /// settled changes nothing, and this keeps returning `false`.
    ///
    /// [`cancel`]: #method.cancel
    pub fn is_cancelled(&self) -> bool {
        self.shared.state.load() == State::Cancelled
    }

    /// Requests cancellation of the promise.
    ///
    /// Fire-and-forget: the call returns immediately and repeated calls do
    /// nothing new. The computation is not preempted: cancellation only
    /// decides which outcome is delivered, and only if it arrives before
    /// the computation's own result. If the computation wins the race, the
    /// promise keeps its result and [`is_cancelled`] stays `false`.
    ///
    /// [`is_cancelled`]: #method.is_cancelled
    ///
    /// # Examples
    ///
    /// ```
    /// # async_std::task::block_on(async {
    /// use std::time::Duration;
    ///
    /// use async_promise::{Deadline, WaitError};
    /// use async_std::task;
    ///
    /// let promise = async_promise::spawn(async {
    ///     task::sleep(Duration::from_secs(1)).await;
    ///     Ok::<_, ()>(())
    /// });
    ///
    /// promise.cancel();
    /// assert_eq!(
    ///     promise.wait(Deadline::never()).await,
    ///     Err(WaitError::Cancelled),
    /// );
    /// assert!(promise.is_cancelled());
    /// # });
    /// ```
    pub fn cancel(&self) {
        if let Some(cancel) = self.cancel.lock().unwrap().take() {
            if log_enabled!(log::Level::Trace) {
                trace!("cancel", { promise_id: self.shared.id.0 });
            }

            // The supervisor is already gone if the promise has settled.
            let _ = cancel.send(());
        }
    }

    /// Reads the settled outcome without blocking.
    ///
    /// Returns `None` while the promise is still pending.
    ///
    /// # Examples
    ///
    /// ```
    /// # async_std::task::block_on(async {
    /// use async_promise::Deadline;
    ///
    /// let promise = async_promise::spawn(async { Ok::<_, ()>(7) });
    /// promise.wait(Deadline::never()).await.unwrap();
    /// assert_eq!(promise.try_wait(), Some(Ok(7)));
    /// # });
    /// ```
    pub fn try_wait(&self) -> Option<Result<T, WaitError<E>>>
    where
        T: Clone,
        E: Clone,
    {
        self.shared.read()
    }

    /// Waits for the promise to settle, up to the given deadline.
    ///
    /// The calling task suspends until the first of three events: the
    /// promise settles, the deadline's timer elapses, or the deadline's
    /// [`StopToken`] fires. The two interruptions map to
    /// [`WaitError::DeadlineExceeded`] and [`WaitError::Cancelled`]
    /// respectively, and neither of them touches the promise itself: a
    /// timed-out or token-aborted wait can be retried later and may then
    /// observe the computation's result.
    ///
    /// Waits may be repeated and may run concurrently from many tasks;
    /// once the promise has settled they all return the same outcome.
    ///
    /// [`StopToken`]: crate::StopToken
    /// [`WaitError::DeadlineExceeded`]: crate::WaitError::DeadlineExceeded
    /// [`WaitError::Cancelled`]: crate::WaitError::Cancelled
    ///
    /// # Examples
    ///
    /// ```
    /// # async_std::task::block_on(async {
    /// use std::time::Duration;
    ///
    /// use async_promise::{Deadline, WaitError};
    /// use async_std::task;
    ///
    /// let promise = async_promise::spawn(async {
    ///     task::sleep(Duration::from_millis(50)).await;
    ///     Ok::<_, ()>("late")
    /// });
    ///
    /// // Too impatient.
    /// assert_eq!(
    ///     promise.wait(Duration::from_millis(5)).await,
    ///     Err(WaitError::DeadlineExceeded),
    /// );
    ///
    /// // Trying again works; the computation never stopped.
    /// assert_eq!(promise.wait(Deadline::never()).await, Ok("late"));
    /// # });
    /// ```
    pub async fn wait(&self, deadline: impl Into<Deadline>) -> Result<T, WaitError<E>>
    where
        T: Clone,
        E: Clone,
    {
        struct WaitFuture<'a, T, E> {
            shared: &'a Shared<T, E>,
            deadline: Deadline,
            opt_key: Option<usize>,
        }

        impl<T, E> WaitFuture<'_, T, E> {
            fn unpark(&mut self) {
                if let Some(key) = self.opt_key.take() {
                    self.shared.wakers.remove(key);
                }
            }
        }

        impl<T: Clone, E: Clone> Future for WaitFuture<'_, T, E> {
            type Output = Result<T, WaitError<E>>;

            fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
                let this = self.get_mut();

                if let Some(res) = this.shared.read() {
                    this.unpark();
                    return Poll::Ready(res);
                }

                // Park before re-checking so a settle between the check
                // above and the registration cannot be missed.
                match this.opt_key {
                    None => this.opt_key = Some(this.shared.wakers.insert(cx)),
                    Some(key) => this.shared.wakers.update(key, cx),
                }

                if let Some(res) = this.shared.read() {
                    this.unpark();
                    return Poll::Ready(res);
                }

                match this.deadline.poll_interrupt(cx) {
                    Poll::Ready(Interrupt::Cancelled) => {
                        this.unpark();
                        Poll::Ready(Err(WaitError::Cancelled))
                    }
                    Poll::Ready(Interrupt::DeadlineExceeded) => {
                        this.unpark();
                        Poll::Ready(Err(WaitError::DeadlineExceeded))
                    }
                    Poll::Pending => Poll::Pending,
                }
            }
        }

        impl<T, E> Drop for WaitFuture<'_, T, E> {
            fn drop(&mut self) {
                self.unpark();
            }
        }

        WaitFuture {
            shared: &*self.shared,
            deadline: deadline.into(),
            opt_key: None,
        }
        .await
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.shared.id)
            .field("state", &self.shared.state.load())
            .finish()
    }
}
