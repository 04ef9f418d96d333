//! Eager, cancellable promises.
//!
//! A [`Promise`] is a handle to a computation that starts running the moment
//! it is spawned and settles exactly once: with the computation's value, with
//! its error, or as cancelled. The handle can be awaited with a deadline,
//! cancelled explicitly, and queried without blocking, while the computation
//! itself runs on [async-std]'s task pools.
//!
//! However many tasks wait on the same promise, and however the computation,
//! a [`cancel`] call, and the caller's deadline interleave, every observer
//! sees the same single terminal outcome. Cancellation is cooperative: it
//! decides which outcome is delivered, but it never preempts a computation
//! that is already running.
//!
//! [async-std]: https://docs.rs/async-std
//! [`cancel`]: Promise::cancel
//!
//! # Examples
//!
//! ```
//! # async_std::task::block_on(async {
//! use std::time::Duration;
//!
//! use async_promise::{Deadline, WaitError};
//!
//! let promise = async_promise::spawn(async { Ok::<_, ()>(1 + 2) });
//! assert_eq!(promise.wait(Deadline::never()).await, Ok(3));
//!
//! // A deadline abandons the wait, not the computation.
//! let promise = async_promise::spawn(async {
//!     async_std::task::sleep(Duration::from_millis(50)).await;
//!     Ok::<_, ()>("done")
//! });
//! assert_eq!(
//!     promise.wait(Duration::from_millis(5)).await,
//!     Err(WaitError::DeadlineExceeded),
//! );
//! assert_eq!(promise.wait(Deadline::never()).await, Ok("done"));
//! # });
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

mod deadline;
mod error;
mod id;
mod promise;
mod spawn;
mod state;
mod stop;
mod waker_list;

pub use deadline::Deadline;
pub use error::WaitError;
pub use id::PromiseId;
pub use promise::Promise;
pub use spawn::{spawn, spawn_blocking};
pub use stop::{StopSource, StopToken};
