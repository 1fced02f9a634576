//! Concurrent batch stress helpers.

use crate::fixtures::Note;
use reldb_core::Store;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total calls submitted.
    pub total_ops: usize,
    /// Calls that succeeded.
    pub successful_ops: usize,
    /// Calls that failed.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Calls per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total calls: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} calls/sec", self.ops_per_second);
    }
}

/// Configuration for a stress run.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of submitting threads.
    pub threads: usize,
    /// Calls submitted by each thread.
    pub calls_per_thread: usize,
    /// Every `fail_every`-th call of a thread fails; 0 disables failures.
    pub fail_every: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            calls_per_thread: 100,
            fail_every: 0,
        }
    }
}

/// Inserts notes from many threads at once through the batcher.
///
/// Each thread submits all of its calls before waiting on any of them, so
/// calls from different threads share batches.
pub fn concurrent_inserts(store: Arc<Store<Note>>, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();

    let workers: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let config = config.clone();
            thread::spawn(move || {
                let handles: Vec<_> = (0..config.calls_per_thread)
                    .map(|i| {
                        let fails = config.fail_every > 0 && (i + 1) % config.fail_every == 0;
                        let note = Note::new(format!("user-{t}"), format!("{t}-{i}"));
                        store.batch_async(move |txn| {
                            txn.new_entry(&mut note.clone())?;
                            if fails {
                                Err(reldb_core::CoreError::aborted("planned failure"))
                            } else {
                                Ok(())
                            }
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|h| h.wait().is_ok())
                    .fold((0usize, 0usize), |(ok, failed), success| {
                        if success {
                            (ok + 1, failed)
                        } else {
                            (ok, failed + 1)
                        }
                    })
            })
        })
        .collect();

    let (successful, failed) = workers
        .into_iter()
        .map(|w| w.join().expect("stress worker panicked"))
        .fold((0usize, 0usize), |(a, b), (ok, failed)| (a + ok, b + failed));

    StressTestResult::new(successful, failed, start.elapsed())
}
