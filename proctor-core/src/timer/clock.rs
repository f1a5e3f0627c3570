//! Second-granularity clocks driving the session countdown.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of one-second ticks for a single countdown.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; returns the number of seconds that passed.
    async fn tick(&mut self) -> u64;
}

/// Hands out tickers. One ticker per countdown.
pub trait Clock: Send + Sync {
    /// Must be called from within a tokio runtime.
    fn ticker(&self) -> Box<dyn Ticker>;
}

/// Wall-clock ticks from the tokio timer. Honours paused time in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn ticker(&self) -> Box<dyn Ticker> {
        let period = Duration::from_secs(1);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Box::new(IntervalTicker(interval))
    }
}

struct IntervalTicker(Interval);

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> u64 {
        self.0.tick().await;
        1
    }
}

/// Clock that only moves when told to.
///
/// Tickers created before a call to [`advance`](Self::advance) observe every
/// second of it; tickers created later do not.
#[derive(Debug, Clone)]
pub struct ManualClock {
    tx: broadcast::Sender<()>,
}

impl ManualClock {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Advance time by `seconds`.
    pub fn advance(&self, seconds: u64) {
        for _ in 0..seconds {
            // No live tickers just means nobody is counting down.
            let _ = self.tx.send(());
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn ticker(&self) -> Box<dyn Ticker> {
        Box::new(ManualTicker {
            rx: self.tx.subscribe(),
        })
    }
}

struct ManualTicker {
    rx: broadcast::Receiver<()>,
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> u64 {
        match self.rx.recv().await {
            Ok(()) => 1,
            Err(broadcast::error::RecvError::Lagged(skipped)) => skipped,
            // Clock dropped: time stands still.
            Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
        }
    }
}
