//! Synthesized transfer progress.
//!
//! The transfer is a single multipart request with no byte-level progress,
//! so progress is simulated: starting at 0%, it advances by a tenth of the
//! file on every tick and stalls below 100%. Only the orchestrator reports
//! 100%, once the provider has answered.

use pawplanet_core::constants::{PROGRESS_CEILING_PERCENT, PROGRESS_STEPS};
use pawplanet_core::UploadProgress;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodic progress emitter for one transfer.
///
/// Must be stopped on every exit path of the transfer. `stop` waits for the
/// task to finish, so no emission can happen after it returns; dropping the
/// ticker cancels and aborts the task as a fallback.
pub struct ProgressTicker {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Start ticking for a payload of `total` bytes.
    ///
    /// `emit` returns `false` when its attempt is no longer current, which
    /// ends the ticker early.
    pub fn start<F>(total: u64, every: Duration, token: CancellationToken, emit: F) -> Self
    where
        F: Fn(UploadProgress) -> bool + Send + 'static,
    {
        let step = (total / PROGRESS_STEPS).max(1);
        let ceiling = total.saturating_mul(PROGRESS_CEILING_PERCENT) / 100;
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticks = interval(every.max(MIN_PERIOD));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the first report is one period in.
            ticks.tick().await;

            let mut current: Option<UploadProgress> = None;
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticks.tick() => {
                        let next = match current {
                            None => UploadProgress::started(total),
                            Some(progress) => progress.advance(step, ceiling),
                        };
                        current = Some(next);
                        tracing::trace!(loaded = next.loaded, total, "Synthesized upload progress");
                        if !emit(next) {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Cancel and wait until the ticker task has exited.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Progress ticker panicked");
                }
            }
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<UploadProgress>>>, impl Fn(UploadProgress) -> bool) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        (events, move |p| {
            sink.lock().unwrap().push(p);
            true
        })
    }

    #[tokio::test(start_paused = true)]
    async fn first_report_is_zero_after_one_period() {
        let (events, emit) = recorder();
        let ticker = ProgressTicker::start(1000, Duration::from_millis(200), CancellationToken::new(), emit);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(events.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        let snapshot = events.lock().unwrap().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].loaded, 0);
        assert_eq!(snapshot[0].percentage, 0.0);

        ticker.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn advances_in_tenths_and_stalls_below_complete() {
        let (events, emit) = recorder();
        let ticker = ProgressTicker::start(1000, Duration::from_millis(200), CancellationToken::new(), emit);

        tokio::time::sleep(Duration::from_secs(10)).await;
        ticker.stop().await;

        let snapshot = events.lock().unwrap().clone();
        assert_eq!(snapshot[1].loaded, 100);
        assert_eq!(snapshot[2].loaded, 200);
        assert!(snapshot.windows(2).all(|w| w[0].loaded <= w[1].loaded));
        let last = snapshot.last().unwrap();
        assert_eq!(last.loaded, 950);
        assert!(!last.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn no_emission_after_stop() {
        let (events, emit) = recorder();
        let ticker = ProgressTicker::start(1000, Duration::from_millis(200), CancellationToken::new(), emit);

        tokio::time::sleep(Duration::from_millis(650)).await;
        ticker.stop().await;
        let count = events.lock().unwrap().len();
        assert_eq!(count, 3);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(events.lock().unwrap().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_ticker() {
        let (events, emit) = recorder();
        let parent = CancellationToken::new();
        let _ticker = ProgressTicker::start(1000, Duration::from_millis(200), parent.child_token(), emit);

        tokio::time::sleep(Duration::from_millis(450)).await;
        parent.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let count = events.lock().unwrap().len();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(events.lock().unwrap().len(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn emitter_refusal_ends_ticker() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let ticker = ProgressTicker::start(
            1000,
            Duration::from_millis(200),
            CancellationToken::new(),
            move |_| {
                *counter.lock().unwrap() += 1;
                false
            },
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*calls.lock().unwrap(), 1);
        ticker.stop().await;
    }
}
