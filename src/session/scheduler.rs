use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Identifies a scheduled job so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(u64);

#[derive(Debug)]
struct Scheduled<J> {
    handle: JobHandle,
    period: Option<Duration>,
    job: J,
}

/// Cooperative single-threaded job queue running on virtual time.
///
/// Jobs are plain values; the owner pulls them out with [`Scheduler::pop_due`]
/// and runs them itself, so a job may cancel or schedule others before the
/// next one is released. Jobs due at the same instant come out in the order
/// they were scheduled.
#[derive(Debug)]
pub struct Scheduler<J> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Scheduled<J>>,
    index: HashMap<JobHandle, (Duration, u64)>,
}

impl<J: Clone> Scheduler<J> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Virtual time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `job` once, `delay` from now
    pub fn schedule_after(&mut self, delay: Duration, job: J) -> JobHandle {
        let handle = JobHandle(self.bump_seq());
        self.enqueue(handle, self.now.saturating_add(delay), None, job);
        handle
    }

    /// Run `job` every `period` until cancelled
    pub fn schedule_every(&mut self, period: Duration, job: J) -> JobHandle {
        let handle = JobHandle(self.bump_seq());
        self.enqueue(handle, self.now.saturating_add(period), Some(period), job);
        handle
    }

    /// Drop a pending job. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: JobHandle) -> bool {
        match self.index.remove(&handle) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_scheduled(&self, handle: JobHandle) -> bool {
        self.index.contains_key(&handle)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Release the earliest job due no later than `deadline`, moving the
    /// clock to its due time. Periodic jobs are queued again one period on,
    /// unless that would run past the end of representable time.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<J> {
        let key = *self.queue.keys().next()?;
        if key.0 > deadline {
            return None;
        }

        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.handle);
        self.now = self.now.max(key.0);

        if let Some(next) = entry.period.and_then(|period| key.0.checked_add(period)) {
            self.enqueue(entry.handle, next, entry.period, entry.job.clone());
        }

        Some(entry.job)
    }

    /// Move the clock forward to `deadline` once everything due has run
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn enqueue(&mut self, handle: JobHandle, due: Duration, period: Option<Duration>, job: J) {
        let key = (due, self.bump_seq());
        self.index.insert(handle, key);
        self.queue.insert(key, Scheduled { handle, period, job });
    }
}

impl<J: Clone> Default for Scheduler<J> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler<&'static str>, deadline: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(job) = scheduler.pop_due(deadline) {
            fired.push(job);
        }
        scheduler.settle(deadline);
        fired
    }

    #[test]
    fn test_one_shot_runs_once() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(Duration::from_millis(2500), "loan");

        assert!(drain(&mut scheduler, Duration::from_secs(2)).is_empty());
        assert_eq!(drain(&mut scheduler, Duration::from_secs(3)), vec!["loan"]);
        assert!(drain(&mut scheduler, Duration::from_secs(10)).is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_periodic_repeats_until_cancelled() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule_every(Duration::from_secs(1), "tick");

        assert_eq!(drain(&mut scheduler, Duration::from_secs(3)).len(), 3);
        assert!(scheduler.is_scheduled(handle));

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(drain(&mut scheduler, Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_jobs_come_out_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_after(Duration::from_secs(3), "late");
        scheduler.schedule_after(Duration::from_secs(1), "early");
        scheduler.schedule_after(Duration::from_secs(1), "early-second");

        assert_eq!(
            drain(&mut scheduler, Duration::from_secs(5)),
            vec!["early", "early-second", "late"]
        );
        assert_eq!(scheduler.now(), Duration::from_secs(5));
    }

    #[test]
    fn test_periodic_job_stops_at_end_of_time() {
        let mut scheduler = Scheduler::new();
        scheduler.settle(Duration::MAX - Duration::from_millis(500));
        let handle = scheduler.schedule_every(Duration::from_secs(1), "tick");

        assert_eq!(drain(&mut scheduler, Duration::MAX), vec!["tick"]);
        assert!(!scheduler.is_scheduled(handle));

        scheduler.schedule_after(Duration::from_secs(5), "loan");
        assert_eq!(drain(&mut scheduler, Duration::MAX), vec!["loan"]);
    }

    #[test]
    fn test_delay_is_relative_to_virtual_now() {
        let mut scheduler = Scheduler::new();
        scheduler.settle(Duration::from_secs(10));
        scheduler.schedule_after(Duration::from_secs(1), "job");

        assert!(drain(&mut scheduler, Duration::from_secs(10)).is_empty());
        assert_eq!(drain(&mut scheduler, Duration::from_secs(11)), vec!["job"]);
    }
}
