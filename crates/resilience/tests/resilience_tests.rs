//! Integration tests for the retry combinator

use ledgersync_resilience::{with_retry, with_retry_notify, ResilienceError, RetryPolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn sync_backoff() -> RetryPolicy {
    RetryPolicy::new(5)
        .with_initial_delay(Duration::from_secs(1))
        .with_multiplier(2.0)
        .with_jitter(false)
}

#[tokio::test(start_paused = true)]
async fn test_five_attempts_then_give_up() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let result = with_retry(&sync_backoff(), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("server unavailable".to_string())
        }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(matches!(
        result,
        Err(ResilienceError::RetriesExhausted { attempts: 5, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_sleeps_follow_the_doubling_schedule() {
    let mut sleeps = Vec::new();
    let mut last = tokio::time::Instant::now();

    let _ = with_retry_notify(
        &sync_backoff(),
        || {
            let now = tokio::time::Instant::now();
            sleeps.push(now - last);
            last = now;
            async { Err::<(), _>("nope") }
        },
        |_| {},
    )
    .await;

    // The first attempt starts immediately, then 1, 2, 4, 8 between retries
    let secs: Vec<u64> = sleeps.iter().map(|d| d.as_secs()).collect();
    assert_eq!(secs, vec![0, 1, 2, 4, 8]);
    assert_eq!(sync_backoff().delay_for_attempt(5), Duration::from_secs(16));
}

#[tokio::test(start_paused = true)]
async fn test_runs_concurrently_with_other_tasks() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                tokio::time::sleep(Duration::from_millis(500)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = attempts.clone();
    let result = with_retry(&sync_backoff(), move || {
        let seen = seen.clone();
        async move {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("flaky")
            } else {
                Ok("done")
            }
        }
    })
    .await;

    assert_eq!(result.ok(), Some("done"));
    // 3 seconds of backoff elapsed while the ticker kept running
    assert!(ticks.load(Ordering::SeqCst) >= 5);
    ticker.await.unwrap();
}
