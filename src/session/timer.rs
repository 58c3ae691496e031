use log::debug;
use std::time::Duration;

use super::scheduler::{JobHandle, Scheduler};

/// Countdown granularity
pub const TICK: Duration = Duration::from_secs(1);

/// Outcome of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Still counting, with the seconds left
    Running(u64),
    /// Reached zero on this tick; the countdown has stopped
    Expired,
    /// A tick arrived while no countdown was live
    Idle,
}

/// Inactivity countdown driven by a periodic scheduler job
#[derive(Debug)]
pub struct SessionTimer {
    duration_secs: u64,
    remaining: u64,
    handle: Option<JobHandle>,
}

impl SessionTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining: 0,
            handle: None,
        }
    }

    /// Seconds left on the live countdown, zero when stopped
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Begin counting down from the full duration. Any live countdown is
    /// replaced, so there is never more than one.
    pub fn start<J: Clone>(&mut self, scheduler: &mut Scheduler<J>, tick_job: J) {
        self.cancel(scheduler);
        self.remaining = self.duration_secs;
        self.handle = Some(scheduler.schedule_every(TICK, tick_job));
        debug!("Session timer started at {}s", self.duration_secs);
    }

    /// Restart at the full duration after qualifying activity
    pub fn reset<J: Clone>(&mut self, scheduler: &mut Scheduler<J>, tick_job: J) {
        self.start(scheduler, tick_job);
    }

    /// Stop without expiring
    pub fn cancel<J: Clone>(&mut self, scheduler: &mut Scheduler<J>) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
        self.remaining = 0;
    }

    /// Advance the countdown by one tick
    pub fn tick<J: Clone>(&mut self, scheduler: &mut Scheduler<J>) -> TimerTick {
        if self.handle.is_none() {
            return TimerTick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TimerTick::Running(self.remaining);
        }

        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
        TimerTick::Expired
    }
}
