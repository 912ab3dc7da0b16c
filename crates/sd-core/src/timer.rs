//! Session timer shown while an analysis is active.
//!
//! The timer does not own a thread. The host event loop either delivers one
//! tick per period through [`SessionTimer::tick`] or calls
//! [`SessionTimer::catch_up`] with the current wall time once per frame.
//! Each start hands out a fresh [`TimerHandle`]; ticks carrying a handle from
//! an earlier start are ignored, so a tick already queued when the timer was
//! stopped cannot advance it.

use std::time::{Duration, Instant};

use crate::format_elapsed;

/// Tick period used by the dashboard display.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Identifies one start..stop interval of a [`SessionTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
pub struct SessionTimer {
    period: Duration,
    ticks: u64,
    active: Option<TimerHandle>,
    next_generation: u64,
    last_tick_at: Option<Instant>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl SessionTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: if period.is_zero() { DEFAULT_TICK } else { period },
            ticks: 0,
            active: None,
            next_generation: 0,
            last_tick_at: None,
        }
    }

    /// Start ticking. Returns `None` if the timer is already running.
    pub fn start(&mut self, now: Instant) -> Option<TimerHandle> {
        if self.active.is_some() {
            return None;
        }
        self.next_generation += 1;
        let handle = TimerHandle(self.next_generation);
        self.active = Some(handle);
        self.last_tick_at = Some(now);
        Some(handle)
    }

    /// Stop ticking, keeping the elapsed time.
    ///
    /// Returns `true` only for the call that actually cancelled the interval.
    pub fn stop(&mut self) -> bool {
        self.last_tick_at = None;
        self.active.take().is_some()
    }

    /// Stop and rewind to zero.
    pub fn reset(&mut self) {
        self.stop();
        self.ticks = 0;
    }

    /// Apply one tick. Stale handles are ignored.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        if self.active != Some(handle) {
            return false;
        }
        self.ticks += 1;
        true
    }

    /// Apply every whole period elapsed since the previous tick.
    ///
    /// Returns the number of ticks applied.
    pub fn catch_up(&mut self, now: Instant) -> u64 {
        let Some(last) = self.last_tick_at else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(last);
        let due = (elapsed.as_nanos() / self.period.as_nanos()) as u64;
        if due > 0 {
            self.ticks += due;
            let advanced = self.period.saturating_mul(due.min(u32::MAX as u64) as u32);
            self.last_tick_at = Some(last + advanced);
        }
        due
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.active
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.ticks as f64 * self.period.as_secs_f64()
    }

    /// Current display string.
    pub fn display(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_idempotent_while_running() {
        let mut timer = SessionTimer::default();
        let now = Instant::now();
        assert!(timer.start(now).is_some());
        assert!(timer.start(now).is_none());
        assert!(timer.is_running());
    }

    #[test]
    fn stop_cancels_exactly_once() {
        let mut timer = SessionTimer::default();
        timer.start(Instant::now());
        assert!(timer.stop());
        assert!(!timer.stop());
        assert!(!timer.is_running());
    }

    #[test]
    fn ticks_advance_elapsed_time() {
        let mut timer = SessionTimer::default();
        let handle = timer.start(Instant::now()).unwrap();
        for _ in 0..150 {
            assert!(timer.tick(handle));
        }
        assert_eq!(timer.display(), "1.50");
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut timer = SessionTimer::default();
        let first = timer.start(Instant::now()).unwrap();
        timer.tick(first);
        timer.stop();
        assert!(!timer.tick(first));

        let second = timer.start(Instant::now()).unwrap();
        assert_ne!(first, second);
        assert!(!timer.tick(first));
        assert!(timer.tick(second));
        assert_eq!(timer.display(), "0.02");
    }

    #[test]
    fn reset_rewinds_and_stops() {
        let mut timer = SessionTimer::default();
        let handle = timer.start(Instant::now()).unwrap();
        timer.tick(handle);
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_seconds(), 0.0);
        assert_eq!(timer.display(), "0.00");
    }

    #[test]
    fn catch_up_applies_whole_periods() {
        let mut timer = SessionTimer::default();
        let t0 = Instant::now();
        timer.start(t0);
        assert_eq!(timer.catch_up(t0 + Duration::from_millis(35)), 3);
        assert_eq!(timer.catch_up(t0 + Duration::from_millis(41)), 1);
        assert_eq!(timer.display(), "0.04");

        timer.stop();
        assert_eq!(timer.catch_up(t0 + Duration::from_secs(5)), 0);
    }
}
