//! Recurring task scheduler
//!
//! Holds a single recurring job and fires it on a fixed interval. Triggers
//! are fire-and-forget: the loop never awaits a run and a failing run never
//! stops the timer. An in-flight guard skips triggers that arrive while a
//! run is still active, so dump processes never overlap.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

/// A job the scheduler can fire on its interval
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> Result<()>;
}

/// Owns one recurring job and its wall-clock trigger
pub struct Scheduler {
    interval: Duration,
    job: Arc<dyn ScheduledJob>,
    in_flight: Arc<Mutex<()>>,
}

impl Scheduler {
    pub fn new(interval: Duration, job: Arc<dyn ScheduledJob>) -> Self {
        Self {
            interval,
            job,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Run the scheduling loop until the process is shut down.
    ///
    /// Consumes the scheduler, so a second `run` on the same schedule is a
    /// compile error rather than a double-registration. The first trigger
    /// fires immediately at boot, then once per interval. Ticks missed while
    /// the process was busy are skipped, not replayed.
    pub async fn run(self) {
        info!(
            "Schedule started for '{}', firing every {:?}",
            self.job.name(),
            self.interval
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.trigger();
        }
    }

    /// Fire the job once, unless a run is already in flight.
    ///
    /// Returns the spawned task handle, or `None` when the trigger was
    /// skipped because of the in-flight guard.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        let Ok(guard) = self.in_flight.clone().try_lock_owned() else {
            warn!(
                "Previous run of '{}' still in flight, skipping trigger",
                self.job.name()
            );
            return None;
        };

        let job = self.job.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            info!("Trigger fired for '{}'", job.name());
            if let Err(e) = job.run().await {
                error!("Scheduled run of '{}' failed: {:#}", job.name(), e);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct CountingJob {
        runs: AtomicUsize,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl CountingJob {
        fn new() -> Self {
            Self {
                runs: AtomicUsize::new(0),
                gate: None,
                fail: false,
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                runs: AtomicUsize::new(0),
                gate: Some(gate),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                runs: AtomicUsize::new(0),
                gate: None,
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &str {
            "counting-job"
        }

        async fn run(&self) -> Result<()> {
            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("simulated failure")
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_trigger_runs_job_once() {
        let job = Arc::new(CountingJob::new());
        let scheduler = Scheduler::new(Duration::from_secs(3600), job.clone());

        let handle = scheduler.trigger().expect("first trigger should fire");
        handle.await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let gate = Arc::new(Notify::new());
        let job = Arc::new(CountingJob::gated(gate.clone()));
        let scheduler = Scheduler::new(Duration::from_secs(3600), job.clone());

        // First trigger holds the guard while the job waits on the gate
        let handle = scheduler.trigger().expect("first trigger should fire");

        // A second trigger while the run is in flight must not start a job
        assert!(scheduler.trigger().is_none());
        assert!(scheduler.trigger().is_none());

        gate.notify_one();
        handle.await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guard_released_after_run_completes() {
        let job = Arc::new(CountingJob::new());
        let scheduler = Scheduler::new(Duration::from_secs(3600), job.clone());

        let first = scheduler.trigger().expect("first trigger should fire");
        first.await.unwrap();

        let second = scheduler.trigger().expect("guard should be free again");
        second.await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_fires_once_per_period() {
        let job = Arc::new(CountingJob::new());
        let scheduler = Scheduler::new(Duration::from_secs(60), job.clone());
        let loop_handle = tokio::spawn(scheduler.run());

        // First trigger fires at boot
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        // Half an interval later nothing new has fired
        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        // Crossing the interval boundary fires exactly one more run
        tokio::time::advance(Duration::from_secs(30)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 2);

        // And again for the next full interval
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);

        loop_handle.abort();
    }

    #[tokio::test]
    async fn test_job_failure_does_not_poison_the_schedule() {
        let job = Arc::new(CountingJob::failing());
        let scheduler = Scheduler::new(Duration::from_secs(3600), job.clone());

        let first = scheduler.trigger().expect("first trigger should fire");
        first.await.unwrap();

        // The failure was contained; the next trigger still fires
        let second = scheduler.trigger().expect("trigger after failure should fire");
        second.await.unwrap();

        assert_eq!(job.runs.load(Ordering::SeqCst), 2);
    }
}
