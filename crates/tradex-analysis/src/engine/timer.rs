//! Cadence timer with an owned cancellation handle
//!
//! A [`CadenceTimer`] runs a [`TickHandler`] on a fixed period: the first
//! tick fires immediately, later ones every `period` after the previous
//! tick. The handler decides after each tick whether to keep going.
//!
//! A timer is disarmed exactly once, by whichever happens first:
//! - the handler returns [`TickControl::Stop`],
//! - [`CadenceTimer::cancel`] is called,
//! - the timer is dropped.
//!
//! A shared [`TimerLedger`] counts armed timers so owners can check that no
//! more than one is ever running.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Returned by a handler after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Work performed on every tick
#[async_trait]
pub trait TickHandler: Send + 'static {
    async fn on_tick(&mut self) -> TickControl;
}

/// Counters shared by every timer armed from the same owner
#[derive(Debug, Clone, Default)]
pub struct TimerLedger {
    counts: Arc<LedgerCounts>,
}

#[derive(Debug, Default)]
struct LedgerCounts {
    armed: AtomicUsize,
    total_armed: AtomicUsize,
    cancelled: AtomicUsize,
    completed: AtomicUsize,
}

impl TimerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers currently armed
    pub fn armed(&self) -> usize {
        self.counts.armed.load(Ordering::SeqCst)
    }

    /// Timers ever armed
    pub fn total_armed(&self) -> usize {
        self.counts.total_armed.load(Ordering::SeqCst)
    }

    /// Timers disarmed from outside (cancel or drop)
    pub fn cancelled(&self) -> usize {
        self.counts.cancelled.load(Ordering::SeqCst)
    }

    /// Timers whose handler stopped them
    pub fn completed(&self) -> usize {
        self.counts.completed.load(Ordering::SeqCst)
    }

    fn on_arm(&self) {
        self.counts.armed.fetch_add(1, Ordering::SeqCst);
        self.counts.total_armed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_disarm(&self, cancelled: bool) {
        self.counts.armed.fetch_sub(1, Ordering::SeqCst);
        let counter = if cancelled {
            &self.counts.cancelled
        } else {
            &self.counts.completed
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shared "still armed" flag; whoever flips it first does the bookkeeping
#[derive(Debug, Clone)]
struct ArmedFlag {
    armed: Arc<AtomicBool>,
    ledger: TimerLedger,
}

impl ArmedFlag {
    fn disarm(&self, cancelled: bool) -> bool {
        let was_armed = self.armed.swap(false, Ordering::SeqCst);
        if was_armed {
            self.ledger.on_disarm(cancelled);
        }
        was_armed
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

/// Handle to a running cadence; dropping it cancels the cadence
#[derive(Debug)]
pub struct CadenceTimer {
    flag: ArmedFlag,
    handle: JoinHandle<()>,
}

impl CadenceTimer {
    /// Spawn the cadence on the current tokio runtime
    pub fn arm<H: TickHandler>(period: Duration, ledger: &TimerLedger, mut handler: H) -> Self {
        let flag = ArmedFlag {
            armed: Arc::new(AtomicBool::new(true)),
            ledger: ledger.clone(),
        };
        ledger.on_arm();

        let task_flag = flag.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if handler.on_tick().await == TickControl::Stop {
                    break;
                }
            }

            task_flag.disarm(false);
        });

        Self { flag, handle }
    }

    pub fn is_armed(&self) -> bool {
        self.flag.is_armed()
    }

    /// Stop the cadence. Returns whether it was still armed.
    pub fn cancel(self) -> bool {
        self.flag.disarm(true)
        // the handle is aborted when `self` drops here
    }
}

impl Drop for CadenceTimer {
    fn drop(&mut self) {
        self.flag.disarm(true);
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct CountingHandler {
        ticks: Arc<Mutex<Vec<Instant>>>,
        stop_after: Option<usize>,
    }

    #[async_trait]
    impl TickHandler for CountingHandler {
        async fn on_tick(&mut self) -> TickControl {
            let mut ticks = self.ticks.lock().unwrap();
            ticks.push(Instant::now());
            match self.stop_after {
                Some(n) if ticks.len() >= n => TickControl::Stop,
                _ => TickControl::Continue,
            }
        }
    }

    fn handler(stop_after: Option<usize>) -> (CountingHandler, Arc<Mutex<Vec<Instant>>>) {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        (
            CountingHandler {
                ticks: ticks.clone(),
                stop_after,
            },
            ticks,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_periodic() {
        let ledger = TimerLedger::new();
        let (handler, ticks) = handler(Some(3));
        let start = Instant::now();

        let timer = CadenceTimer::arm(Duration::from_millis(3000), &ledger, handler);
        assert_eq!(ledger.armed(), 1);

        tokio::time::sleep(Duration::from_secs(20)).await;

        let ticks = ticks.lock().unwrap().clone();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0] - start, Duration::ZERO);
        assert_eq!(ticks[1] - ticks[0], Duration::from_millis(3000));
        assert_eq!(ticks[2] - ticks[1], Duration::from_millis(3000));

        assert!(!timer.is_armed());
        assert_eq!(ledger.armed(), 0);
        assert_eq!(ledger.completed(), 1);

        // Already stopped: cancelling is a no-op
        assert!(!timer.cancel());
        assert_eq!(ledger.cancelled(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let ledger = TimerLedger::new();
        let (handler, ticks) = handler(None);

        let timer = CadenceTimer::arm(Duration::from_secs(3), &ledger, handler);
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.lock().unwrap().len(), 2);

        assert!(timer.cancel());
        assert_eq!(ledger.armed(), 0);
        assert_eq!(ledger.cancelled(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.lock().unwrap().len(), 2);
        assert_eq!(ledger.cancelled(), 1);
        assert_eq!(ledger.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let ledger = TimerLedger::new();
        let (handler, ticks) = handler(None);

        {
            let _timer = CadenceTimer::arm(Duration::from_secs(1), &ledger, handler);
            tokio::task::yield_now().await;
        }

        assert_eq!(ledger.armed(), 0);
        assert_eq!(ledger.cancelled(), 1);

        let seen = ticks.lock().unwrap().len();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.lock().unwrap().len(), seen);
    }
}
