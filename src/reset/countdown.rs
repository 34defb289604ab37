//! One-second countdown for the lifetime of a one-time code.
//!
//! The countdown owns at most one ticking task. Seeding a new value aborts the
//! previous task, and so do `stop` and drop, so two timers never overlap.

use std::sync::Arc;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Duration, Instant, interval_at},
};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Countdown {
    remaining: Arc<watch::Sender<u64>>,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            remaining: Arc::new(remaining),
            task: None,
        }
    }

    /// Seeds the countdown with `seconds` and starts ticking.
    ///
    /// Must be called from within a tokio runtime when `seconds > 0`.
    pub fn start(&mut self, seconds: u64) {
        self.abort_task();
        self.remaining.send_replace(seconds);

        if seconds == 0 {
            return;
        }

        debug!(seconds, "countdown started");

        let remaining = Arc::clone(&self.remaining);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;

                let mut finished = false;
                remaining.send_modify(|value| {
                    *value = value.saturating_sub(1);
                    finished = *value == 0;
                });

                if finished {
                    break;
                }
            }
        }));
    }

    /// Stops ticking and resets the remaining time to zero.
    pub fn stop(&mut self) {
        self.abort_task();
        self.remaining.send_replace(0);
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        *self.remaining.borrow()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// Receiver that observes every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Formats seconds as `MM:SS`.
#[must_use]
pub fn format_mmss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(59), "00:59");
        assert_eq!(format_mmss(120), "02:00");
        assert_eq!(format_mmss(3599), "59:59");
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_down_once_per_second_and_stops_at_zero() {
        let mut countdown = Countdown::new();
        let mut ticks = countdown.subscribe();
        let started = Instant::now();

        countdown.start(3);
        assert_eq!(countdown.remaining(), 3);
        ticks.borrow_and_update();

        for expected in [2, 1, 0] {
            ticks.changed().await.unwrap();
            assert_eq!(*ticks.borrow_and_update(), expected);
        }
        assert_eq!(started.elapsed(), Duration::from_secs(3));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn reseeding_replaces_the_running_timer() {
        let mut countdown = Countdown::new();
        countdown.start(10);
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(countdown.remaining(), 6);

        countdown.start(10);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        // A leftover timer would have taken two ticks off by now.
        assert_eq!(countdown.remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_resets_and_halts() {
        let mut countdown = Countdown::new();
        countdown.start(120);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(countdown.remaining(), 118);

        countdown.stop();
        assert_eq!(countdown.remaining(), 0);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(countdown.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_the_ticking_task() {
        let mut countdown = Countdown::new();
        let mut ticks = countdown.subscribe();
        countdown.start(60);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(*ticks.borrow_and_update(), 58);

        drop(countdown);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!ticks.has_changed().unwrap_or(false));
        assert_eq!(*ticks.borrow(), 58);
    }

    #[tokio::test(start_paused = true)]
    async fn seeding_zero_does_not_tick() {
        let mut countdown = Countdown::new();
        countdown.start(0);
        assert!(!countdown.is_active());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(countdown.remaining(), 0);
    }
}
