//! Fixed-rate render schedule.
//!
//! The loop does not own a thread. The host polls it with the current time and
//! runs one render tick whenever `poll` says one is due, so a tick always runs
//! to completion before the next can be considered. At most one schedule exists
//! at a time; starting again cancels the previous one first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// 10 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Shared cancel flag for one schedule.
///
/// Cloning hands out another handle to the same schedule; cancelling any handle
/// stops it at the next poll.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

struct Schedule {
    token: CancelToken,
    next_due: Instant,
    ticks: u64,
}

pub struct RenderLoop {
    interval: Duration,
    schedule: Option<Schedule>,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            interval: TICK_INTERVAL,
            schedule: None,
        }
    }

    /// Begin ticking; the first tick is due one interval after `now`.
    /// Any running schedule is cancelled first.
    pub fn start(&mut self, now: Instant) -> CancelToken {
        if self.schedule.is_some() {
            debug!("Render loop restarted; cancelling previous schedule");
            self.stop();
        }

        let token = CancelToken::new();
        self.schedule = Some(Schedule {
            token: token.clone(),
            next_due: now + self.interval,
            ticks: 0,
        });
        info!(interval_ms = self.interval.as_millis() as u64, "Render loop started");
        token
    }

    /// Cancel the schedule. No tick fires after this, even one already due.
    pub fn stop(&mut self) {
        if let Some(schedule) = self.schedule.take() {
            schedule.token.cancel();
            info!(ticks = schedule.ticks, "Render loop stopped");
        }
    }

    pub fn state(&self) -> LoopState {
        match &self.schedule {
            Some(s) if !s.token.is_cancelled() => LoopState::Running,
            _ => LoopState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// True when a tick is due at `now`. Missed periods collapse into a single
    /// tick and the following deadline stays on the original grid.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(schedule) = self.schedule.as_mut() else {
            return false;
        };

        if schedule.token.is_cancelled() {
            debug!("Render loop cancelled through its token");
            self.stop();
            return false;
        }

        if now < schedule.next_due {
            return false;
        }

        while schedule.next_due <= now {
            schedule.next_due += self.interval;
        }
        schedule.ticks += 1;
        trace!(tick = schedule.ticks, "Render tick due");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn ticks_every_interval_after_start() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new();
        rl.start(t0);

        assert!(!rl.poll(t0));
        assert!(!rl.poll(t0 + ms(99)));
        assert!(rl.poll(t0 + ms(100)));
        assert!(!rl.poll(t0 + ms(150)));
        assert!(rl.poll(t0 + ms(205)));
        // Still on the 100 ms grid, not 205 + 100.
        assert!(!rl.poll(t0 + ms(299)));
        assert!(rl.poll(t0 + ms(300)));
    }

    #[test]
    fn missed_periods_collapse_into_one_tick() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new();
        rl.start(t0);

        assert!(rl.poll(t0 + ms(450)));
        assert!(!rl.poll(t0 + ms(460)));
        assert!(rl.poll(t0 + ms(500)));
    }

    #[test]
    fn stop_suppresses_a_due_tick() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new();
        let token = rl.start(t0);

        rl.stop();
        assert!(token.is_cancelled());
        assert_eq!(rl.state(), LoopState::Stopped);
        assert!(!rl.poll(t0 + ms(100)));
        assert!(!rl.poll(t0 + ms(1000)));
    }

    #[test]
    fn restart_cancels_the_previous_schedule() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new();
        let first = rl.start(t0);
        let second = rl.start(t0 + ms(50));

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        // Only the new grid counts: nothing at 100, one tick at 150.
        assert!(!rl.poll(t0 + ms(100)));
        assert!(rl.poll(t0 + ms(150)));
        assert!(!rl.poll(t0 + ms(150)));
    }

    #[test]
    fn external_cancel_stops_the_loop() {
        let t0 = Instant::now();
        let mut rl = RenderLoop::new();
        let token = rl.start(t0);
        assert!(rl.is_running());

        token.clone().cancel();
        assert!(!rl.is_running());
        assert!(!rl.poll(t0 + ms(100)));
        assert_eq!(rl.state(), LoopState::Stopped);
    }

    #[test]
    fn stopped_loop_never_ticks() {
        let mut rl = RenderLoop::default();
        assert!(!rl.poll(Instant::now() + ms(1000)));
    }
}
