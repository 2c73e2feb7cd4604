use crate::domain::ports::TimerJob;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// How often a timer job runs, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSchedule {
    minutes: u32,
}

impl TimerSchedule {
    pub const DEFAULT_MINUTES: u32 = 5;

    pub fn every_minutes(minutes: u32) -> Self {
        Self {
            minutes: minutes.max(1),
        }
    }

    /// An unconfigured schedule falls back to every five minutes.
    pub fn from_config(minutes: Option<u32>) -> Self {
        minutes.map_or_else(Self::default, Self::every_minutes)
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes) * 60)
    }
}

impl Default for TimerSchedule {
    fn default() -> Self {
        Self {
            minutes: Self::DEFAULT_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub runs: u64,
    pub clean_runs: u64,
}

/// Drives a [`TimerJob`] on its interval. Runs never overlap and a run in
/// progress is always allowed to finish.
pub struct TimerEngine<J: TimerJob> {
    job: J,
}

impl<J: TimerJob> TimerEngine<J> {
    pub fn new(job: J) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &J {
        &self.job
    }

    pub async fn run_once(&self) -> bool {
        let started = Instant::now();
        tracing::debug!(job = self.job.name(), "timer job starting");

        let clean = self.job.run().await;

        if clean {
            tracing::debug!(job = self.job.name(), elapsed = ?started.elapsed(), "timer job finished");
        } else {
            tracing::warn!(
                job = self.job.name(),
                elapsed = ?started.elapsed(),
                "timer job did not finish cleanly, next tick will retry"
            );
        }
        clean
    }

    /// Ticks until `shutdown` flips to `true` (or its sender goes away), then
    /// calls the job's shutdown hook.
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> EngineStats {
        let period = self.job.interval();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = EngineStats::default();

        tracing::info!(job = self.job.name(), ?period, "⏱️ scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    stats.runs += 1;
                    if self.run_once().await {
                        stats.clean_runs += 1;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            job = self.job.name(),
            runs = stats.runs,
            clean_runs = stats.clean_runs,
            "scheduler stopped"
        );
        self.job.shutdown().await;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingJob {
        runs: Arc<AtomicU64>,
        shut_down: Arc<AtomicBool>,
        fail: bool,
    }

    #[async_trait]
    impl TimerJob for CountingJob {
        fn name(&self) -> &str {
            "counting"
        }

        fn interval(&self) -> Duration {
            Duration::from_millis(10)
        }

        async fn run(&self) -> bool {
            self.runs.fetch_add(1, Ordering::SeqCst);
            !self.fail
        }

        async fn shutdown(&self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_schedule_defaults() {
        assert_eq!(TimerSchedule::default().minutes(), 5);
        assert_eq!(TimerSchedule::from_config(None).minutes(), 5);
        assert_eq!(TimerSchedule::from_config(Some(30)).minutes(), 30);
        assert_eq!(TimerSchedule::every_minutes(0).minutes(), 1);
        assert_eq!(
            TimerSchedule::every_minutes(2).as_duration(),
            Duration::from_secs(120)
        );
    }

    #[tokio::test]
    async fn test_run_once_reports_job_result() {
        let engine = TimerEngine::new(CountingJob {
            fail: true,
            ..CountingJob::default()
        });
        assert!(!engine.run_once().await);
        assert_eq!(engine.job().runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_runs_until_shutdown() {
        let job = CountingJob::default();
        let runs = job.runs.clone();
        let shut_down = job.shut_down.clone();
        let engine = Arc::new(TimerEngine::new(job));
        let (tx, rx) = watch::channel(false);

        let handle = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.run_until(rx).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        let stats = handle.await.unwrap();

        assert!(stats.runs >= 1);
        assert_eq!(stats.runs, stats.clean_runs);
        assert_eq!(stats.runs, runs.load(Ordering::SeqCst));
        assert!(shut_down.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_engine_stops_when_sender_dropped() {
        let engine = TimerEngine::new(CountingJob::default());
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let stats = engine.run_until(rx).await;
        assert!(engine.job().shut_down.load(Ordering::SeqCst));
        assert!(stats.runs <= 1);
    }
}
