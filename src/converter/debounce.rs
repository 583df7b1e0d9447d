//! Delayed, coalescing trigger
//!
//! Scheduling replaces any trigger that has not fired yet. Once the delay has
//! elapsed the task runs to completion; cancellation only ever hits the timer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the most recently scheduled task once `delay` has passed without a newer one
#[derive(Clone, Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Option<CancellationToken>>>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule `task` after the delay, cancelling a trigger that has not fired yet
    pub(crate) async fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("debounced trigger superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    debug!(delay_ms = delay.as_millis() as u64, "debounced trigger fired");
                    task.await;
                }
            }
        });
    }

    /// Cancel the trigger that has not fired yet, if any
    pub(crate) async fn cancel(&self) {
        if let Some(token) = self.pending.lock().await.take() {
            token.cancel();
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn fires_once_after_delay() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        let runs = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(&runs)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rapid_schedules_coalesce_into_one_run() {
        let debouncer = Debouncer::new(Duration::from_millis(60));
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            debouncer.schedule(counting_task(&runs)).await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn latest_task_wins() {
        let debouncer = Debouncer::new(Duration::from_millis(40));
        let last = Arc::new(AtomicUsize::new(0));

        for value in 1..=3 {
            let last = Arc::clone(&last);
            debouncer
                .schedule(async move {
                    last.store(value, Ordering::SeqCst);
                })
                .await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancel_prevents_pending_run() {
        let debouncer = Debouncer::new(Duration::from_millis(40));
        let runs = Arc::new(AtomicUsize::new(0));

        debouncer.schedule(counting_task(&runs)).await;
        debouncer.cancel().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_after_fire_does_not_abort_running_task() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        debouncer
            .schedule(async move {
                tokio::time::sleep(Duration::from_millis(80)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        // Trigger has fired and the task is mid-way
        tokio::time::sleep(Duration::from_millis(40)).await;
        debouncer.cancel().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
