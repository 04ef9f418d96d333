use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_std::task;
use futures_channel::oneshot;
use kv_log_macro::trace;
use log::log_enabled;

use crate::id::PromiseId;
use crate::promise::{Outcome, Promise, Shared};

/// Spawns a computation and returns a promise for its result.
///
/// The future starts executing on [async-std]'s task pool right away; this
/// function never suspends and never fails. The computation's `Result` is
/// the promise's outcome: `Ok` settles it with a value, `Err` with the
/// computation's own error. An error is delivered like data; it does not
/// tear anything down.
///
/// [async-std]: https://docs.rs/async-std
///
/// # Examples
///
/// ```
/// # async_std::task::block_on(async {
/// use async_promise::Deadline;
///
/// let promise = async_promise::spawn(async { Ok::<_, ()>(1 + 2) });
/// assert_eq!(promise.wait(Deadline::never()).await, Ok(3));
/// # });
/// ```
pub fn spawn<F, T, E>(future: F) -> Promise<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    launch(|pipe| {
        task::spawn(async move {
            // A oneshot deposit never blocks, so the worker exits even if
            // the promise was cancelled and no one ever drains the pipe.
            let _ = pipe.send(future.await);
        });
    })
}

/// Spawns a blocking computation and returns a promise for its result.
///
/// The closure runs on [async-std]'s dedicated blocking-task pool, so a
/// long synchronous computation does not stall the async executor.
/// Everything else works like [`spawn`], including cancellation, which
/// abandons a running closure rather than interrupting it.
///
/// [async-std]: https://docs.rs/async-std
/// [`spawn`]: fn.spawn.html
///
/// # Examples
///
/// ```
/// # async_std::task::block_on(async {
/// use async_promise::Deadline;
///
/// let promise = async_promise::spawn_blocking(|| Ok::<_, ()>(6 * 7));
/// assert_eq!(promise.wait(Deadline::never()).await, Ok(42));
/// # });
/// ```
pub fn spawn_blocking<F, T, E>(f: F) -> Promise<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    launch(|pipe| {
        task::spawn_blocking(move || {
            let _ = pipe.send(f());
        });
    })
}

/// Wires up the shared state, the worker, and the supervisor.
fn launch<T, E>(spawn_worker: impl FnOnce(oneshot::Sender<Result<T, E>>)) -> Promise<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let id = PromiseId::generate();
    let shared = Arc::new(Shared::new(id));

    if log_enabled!(log::Level::Trace) {
        trace!("spawn", { promise_id: id.0 });
    }

    let (pipe, result) = oneshot::channel();
    let (cancel_tx, cancel) = oneshot::channel();

    spawn_worker(pipe);

    // Supervisor: race cancellation against the worker's deposit and
    // publish the single terminal event.
    let supervisor = shared.clone();
    task::spawn(async move {
        let outcome = Race {
            cancel: Some(cancel),
            result,
        }
        .await;
        supervisor.settle(outcome);
    });

    Promise::new(shared, cancel_tx)
}

/// Races the cancel signal against the worker's deposit.
///
/// Cancellation is polled first, so it wins when both are ready at once. A
/// dropped cancel sender disables that branch: the handle was abandoned
/// without cancelling, and the worker alone decides the outcome.
struct Race<T, E> {
    cancel: Option<oneshot::Receiver<()>>,
    result: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Future for Race<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(cancel) = &mut this.cancel {
            match Pin::new(cancel).poll(cx) {
                Poll::Ready(Ok(())) => return Poll::Ready(Outcome::Cancelled),
                Poll::Ready(Err(oneshot::Canceled)) => this.cancel = None,
                Poll::Pending => {}
            }
        }

        match Pin::new(&mut this.result).poll(cx) {
            Poll::Ready(Ok(Ok(value))) => Poll::Ready(Outcome::Value(value)),
            Poll::Ready(Ok(Err(err))) => Poll::Ready(Outcome::Error(err)),
            // The worker died without a deposit, which only happens when
            // the computation panicked. Settle as cancelled so that no
            // observer hangs.
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Outcome::Cancelled),
            Poll::Pending => Poll::Pending,
        }
    }
}
