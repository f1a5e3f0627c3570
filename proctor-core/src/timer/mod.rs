//! Session countdown
//!
//! A [`SessionTimer`] counts down once per tick of its [`Clock`] and runs a
//! timeout callback exactly once when it reaches zero. Firing and stopping
//! race on a single `running` flag: whichever flips it first wins, so a
//! successful [`SessionTimer::stop`] guarantees the callback never runs.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock, Ticker};

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Owned countdown resource. At most one countdown is live per timer.
pub struct SessionTimer {
    clock: Arc<dyn Clock>,
    countdown: Option<Countdown>,
}

struct Countdown {
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
    remaining: watch::Receiver<u64>,
}

impl SessionTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            countdown: None,
        }
    }

    /// Start counting down from `duration_secs`, replacing any live countdown.
    ///
    /// `on_timeout` runs on the countdown task the instant the remaining time
    /// reaches zero, unless [`stop`](Self::stop) won the race first. Must be
    /// called from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, duration_secs: u64, on_timeout: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();

        let running = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();
        let (remaining_tx, remaining) = watch::channel(duration_secs);
        // Subscribe before returning so ticks issued right after start count.
        let mut ticker = self.clock.ticker();

        let task_running = running.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            debug!(duration_secs, "Countdown started");
            let mut left = duration_secs;
            loop {
                if left == 0 {
                    if task_running
                        .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        info!("Countdown reached zero");
                        on_timeout().await;
                    }
                    break;
                }

                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => {
                        debug!(left, "Countdown cancelled");
                        break;
                    }
                    elapsed = ticker.tick() => {
                        left = left.saturating_sub(elapsed);
                        remaining_tx.send_replace(left);
                    }
                }
            }
        });

        self.countdown = Some(Countdown {
            running,
            cancel,
            remaining,
        });
    }

    /// Stop the live countdown.
    ///
    /// Returns `true` if the countdown was still running, in which case the
    /// timeout callback will never fire. Returns `false` if there was nothing
    /// to stop or the callback already claimed the expiry.
    pub fn stop(&mut self) -> bool {
        let Some(countdown) = self.countdown.as_ref() else {
            return false;
        };
        let stopped = countdown
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        countdown.cancel.cancel();
        stopped
    }

    /// Whether a countdown is live and has not fired.
    pub fn is_running(&self) -> bool {
        self.countdown
            .as_ref()
            .is_some_and(|c| c.running.load(Ordering::Acquire))
    }

    /// Seconds left on the current countdown (0 if none was started).
    pub fn remaining(&self) -> u64 {
        self.countdown
            .as_ref()
            .map_or(0, |c| *c.remaining.borrow())
    }

    /// Watch the remaining seconds of the current countdown.
    pub fn watch_remaining(&self) -> watch::Receiver<u64> {
        match &self.countdown {
            Some(c) => c.remaining.clone(),
            None => watch::channel(0).1,
        }
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
