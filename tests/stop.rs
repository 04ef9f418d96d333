use std::time::Duration;

use async_promise::StopSource;
use async_std::task;

fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn drop_stops_tokens() {
    task::block_on(async {
        let source = StopSource::new();
        let token = source.token();

        drop(source);
        token.await;
    });
}

#[test]
fn stop_wakes_blocked_tokens() {
    task::block_on(async {
        let source = StopSource::new();
        let token = source.token();

        let waiter = task::spawn(async move { token.await });

        task::sleep(ms(10)).await;
        source.stop();
        waiter.await;
    });
}

#[test]
fn clones_resolve_independently() {
    task::block_on(async {
        let source = StopSource::new();
        let token = source.token();
        let clone = token.clone();

        let a = task::spawn(async move { token.await });
        let b = task::spawn(async move { clone.await });

        task::sleep(ms(10)).await;
        drop(source);

        a.await;
        b.await;
    });
}

#[test]
fn is_stopped_snapshot() {
    let source = StopSource::new();
    let token = source.token();

    assert!(!token.is_stopped());
    source.stop();
    assert!(token.is_stopped());
}

#[test]
fn late_token_still_resolves() {
    task::block_on(async {
        let source = StopSource::new();
        let token = source.token();
        source.stop();

        // Issued before the stop, awaited after it.
        token.await;
    });
}
