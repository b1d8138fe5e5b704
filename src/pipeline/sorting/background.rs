//! Background trigger: runs a sorting batch on a fixed interval.
//!
//! One dedicated thread runs `BatchSorter::run_once`, then sleeps until the
//! next interval. Batches never overlap. Sleeping happens in short slices so
//! a shutdown request is noticed quickly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::runner::BatchSorter;

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(250);

/// Handle for the background sorting thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on `Drop`.
pub struct BatchSchedulerHandle {
    shutdown: Arc<AtomicBool>,
    runs: Arc<AtomicU64>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl BatchSchedulerHandle {
    /// Request graceful shutdown. A batch already running completes first.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Number of batches finished so far.
    pub fn runs_completed(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Block until the thread exits (after `shutdown()`, or never).
    pub fn wait(mut self) {
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for BatchSchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start running `sorter` every `interval` on a separate thread, first run immediately.
pub fn start_background_scheduler(sorter: BatchSorter, interval: Duration) -> BatchSchedulerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let runs = Arc::new(AtomicU64::new(0));
    let flag = shutdown.clone();
    let counter = runs.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Background sorting scheduler started"
        );
        scheduler_loop(&sorter, interval, &flag, &counter);
    });

    BatchSchedulerHandle {
        shutdown,
        runs,
        handle: Some(handle),
    }
}

fn scheduler_loop(sorter: &BatchSorter, interval: Duration, shutdown: &AtomicBool, runs: &AtomicU64) {
    while !shutdown.load(Ordering::Relaxed) {
        let result = sorter.run_once();
        runs.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            batch_id = %result.batch_id,
            finished = result.is_finished(),
            "Scheduled batch returned"
        );

        let next = Instant::now() + interval;
        while Instant::now() < next {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            std::thread::sleep(SLEEP_GRANULARITY.min(next.saturating_duration_since(Instant::now())));
        }
    }
    tracing::info!("Background sorting scheduler shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SorterConfig;

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn shutdown_flag_sets_atomic() {
        let handle = BatchSchedulerHandle {
            shutdown: Arc::new(AtomicBool::new(false)),
            runs: Arc::new(AtomicU64::new(0)),
            handle: None,
        };
        assert!(!handle.shutdown.load(Ordering::Relaxed));
        handle.shutdown();
        assert!(handle.shutdown.load(Ordering::Relaxed));
    }

    #[test]
    fn runs_immediately_then_stops_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let source = root.path().join("in");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("a.csv"), "h\n1,x,A\n").unwrap();
        let ok = root.path().join("ok");
        let ng = root.path().join("ng");

        let sorter = BatchSorter::new(SorterConfig::with_dirs(&source, &ok, &ng)).unwrap();
        let handle = start_background_scheduler(sorter, Duration::from_secs(3600));

        assert!(wait_for(|| handle.runs_completed() >= 1));
        assert!(ok.join("a.ok.csv").exists());
        assert!(ok.join("a.ok.end").exists());

        let started = Instant::now();
        drop(handle);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn repeats_on_interval() {
        let root = tempfile::tempdir().unwrap();
        let config = SorterConfig::with_dirs(
            root.path().join("missing"),
            root.path().join("ok"),
            root.path().join("ng"),
        );
        let sorter = BatchSorter::new(config).unwrap();
        let handle = start_background_scheduler(sorter, Duration::from_millis(10));

        assert!(wait_for(|| handle.runs_completed() >= 3));
        handle.shutdown();
        handle.wait();
    }
}
