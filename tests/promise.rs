use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_promise::{spawn, spawn_blocking, Deadline, StopSource, WaitError};
use async_std::task;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn success() {
    task::block_on(async {
        let promise = spawn(async { Ok::<_, ()>("hello") });

        assert_eq!(promise.wait(Deadline::never()).await, Ok("hello"));
        assert!(promise.is_done());
        assert!(!promise.is_cancelled());
    });
}

#[test]
fn failure() {
    task::block_on(async {
        let promise = spawn(async { Err::<(), _>("boom") });

        assert_eq!(
            promise.wait(Deadline::never()).await,
            Err(WaitError::Failed("boom")),
        );
        assert!(promise.is_done());
        assert!(!promise.is_cancelled());
    });
}

#[test]
fn spawn_returns_immediately() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(100)).await;
            Ok::<_, ()>(())
        });

        assert!(!promise.is_done());
        assert_eq!(promise.wait(Deadline::never()).await, Ok(()));
    });
}

#[test]
fn cancel_before_resolve() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(100)).await;
            Ok::<_, ()>("too late")
        });

        promise.cancel();

        assert_eq!(
            promise.wait(Deadline::never()).await,
            Err(WaitError::Cancelled),
        );
        assert!(promise.is_cancelled());
        assert!(promise.is_done());
    });
}

#[test]
fn deadline_does_not_cancel() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(50)).await;
            Ok::<_, ()>("eventually")
        });

        assert_eq!(promise.wait(ms(5)).await, Err(WaitError::DeadlineExceeded));
        assert!(!promise.is_done());
        assert!(!promise.is_cancelled());

        // The computation survived the timed-out wait.
        assert_eq!(promise.wait(Deadline::never()).await, Ok("eventually"));
    });
}

#[test]
fn token_cancels_the_wait_not_the_promise() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(50)).await;
            Ok::<_, ()>(7)
        });

        let source = StopSource::new();
        let token = source.token();

        task::spawn(async move {
            task::sleep(ms(5)).await;
            source.stop();
        });

        assert_eq!(promise.wait(token).await, Err(WaitError::Cancelled));

        // Only the wait was aborted; the promise still resolves.
        assert!(!promise.is_cancelled());
        assert_eq!(promise.wait(Deadline::never()).await, Ok(7));
    });
}

#[test]
fn concurrent_observers_agree() {
    task::block_on(async {
        let promise = Arc::new(spawn(async {
            task::sleep(ms(20)).await;
            Ok::<_, ()>(42)
        }));

        let mut observers = Vec::new();
        for _ in 0..8 {
            let promise = promise.clone();
            observers.push(task::spawn(
                async move { promise.wait(Deadline::never()).await },
            ));
        }

        for observer in observers {
            assert_eq!(observer.await, Ok(42));
        }
    });
}

#[test]
fn failure_is_delivered_to_every_observer() {
    task::block_on(async {
        let promise = Arc::new(spawn(async {
            task::sleep(ms(10)).await;
            Err::<(), _>("exploded")
        }));

        let other = promise.clone();
        let observer = task::spawn(async move { other.wait(Deadline::never()).await });

        assert_eq!(
            promise.wait(Deadline::never()).await,
            Err(WaitError::Failed("exploded")),
        );
        assert_eq!(observer.await, Err(WaitError::Failed("exploded")));
    });
}

#[test]
fn cancel_is_idempotent() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(100)).await;
            Ok::<_, ()>(())
        });

        promise.cancel();
        promise.cancel();

        assert_eq!(
            promise.wait(Deadline::never()).await,
            Err(WaitError::Cancelled),
        );

        promise.cancel();
        assert!(promise.is_cancelled());
    });
}

#[test]
fn cancel_after_completion_is_a_no_op() {
    task::block_on(async {
        let promise = spawn(async { Ok::<_, ()>("first") });
        assert_eq!(promise.wait(Deadline::never()).await, Ok("first"));

        promise.cancel();
        task::sleep(ms(10)).await;

        // The delivered outcome is settled and the status never flips.
        assert_eq!(promise.try_wait(), Some(Ok("first")));
        assert!(!promise.is_cancelled());
    });
}

#[test]
fn try_wait_snapshots() {
    task::block_on(async {
        let promise = spawn(async {
            task::sleep(ms(30)).await;
            Ok::<_, ()>(1)
        });

        assert_eq!(promise.try_wait(), None);
        assert_eq!(promise.wait(Deadline::never()).await, Ok(1));
        assert_eq!(promise.try_wait(), Some(Ok(1)));
    });
}

#[test]
fn blocking_computation() {
    task::block_on(async {
        let promise = spawn_blocking(|| Ok::<_, ()>(6 * 7));
        assert_eq!(promise.wait(Deadline::never()).await, Ok(42));
    });
}

#[test]
fn abandoned_worker_still_exits() {
    task::block_on(async {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let promise = spawn_blocking(move || {
            thread::sleep(ms(50));
            flag.store(true, Ordering::SeqCst);
            Ok::<_, ()>(())
        });

        promise.cancel();
        assert_eq!(
            promise.wait(Deadline::never()).await,
            Err(WaitError::Cancelled),
        );
        assert!(!finished.load(Ordering::SeqCst));

        // The deposit slot always has room, so the abandoned computation
        // runs to completion and its thread is released.
        task::sleep(ms(150)).await;
        assert!(finished.load(Ordering::SeqCst));
        assert_eq!(promise.try_wait(), Some(Err(WaitError::Cancelled)));
    });
}

#[test]
fn ids_are_unique() {
    let a = spawn(async { Ok::<_, ()>(()) });
    let b = spawn(async { Ok::<_, ()>(()) });
    assert_ne!(a.id(), b.id());
}
