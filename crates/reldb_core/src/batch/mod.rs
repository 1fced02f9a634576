//! Write batching.
//!
//! The [`Batcher`] collects calls from any number of threads and runs them
//! together in one write transaction. A batch is flushed when it reaches
//! `max_batch_calls`, or `max_batch_duration` after its first call arrived.
//!
//! ## Run protocol
//!
//! Calls run in append order inside one transaction, stopping at the first
//! failure. Then:
//!
//! - if the store is closed, every call in the batch gets `Closed`
//! - if nothing failed, every call gets `Ok(())`
//! - otherwise the batch splits at the failing call `k`. The prefix
//!   `[0, k)` is re-run as a batch of its own (or, with retries disabled,
//!   told that its batch was aborted), call `k` gets its own error, and the
//!   suffix `(k, n)` is run through the same protocol
//!
//! Each split consumes at least one call, so recursion depth is bounded by
//! the batch size.
//!
//! ## Concurrency
//!
//! One mutex guards the pending calls and the timer token, and is held for
//! the whole flush, so at most one flush runs at a time. The timer is a
//! one-shot thread carrying a generation token; a flush clears the token,
//! which turns a timer that fires later into a no-op.
//!
//! Transaction functions run while the batcher lock is held and must not
//! submit batched calls themselves.

mod call;

pub use call::{BatchHandle, Call, CallFn};

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::stats::StoreStats;
use crate::transaction::{guarded_call, Transaction};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Opens write transactions for the batcher.
pub trait BatchRunner<T>: Send + Sync {
    /// Runs `f` in one write transaction, committing if it returns `Ok` and
    /// rolling back otherwise.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error opening or committing the
    /// transaction. `CoreError::Closed` when the store is closed.
    fn run_batch(
        &self,
        f: &mut dyn FnMut(&mut Transaction<'_, T>) -> CoreResult<()>,
    ) -> CoreResult<()>;
}

#[derive(Debug, Clone, Copy)]
struct BatchConfig {
    max_calls: usize,
    max_duration: Duration,
    retry: bool,
}

struct BatchState<T> {
    calls: Vec<Call<T>>,
    /// Generation of the armed timer, if any.
    timer: Option<u64>,
    generation: u64,
}

struct Shared<T> {
    state: Mutex<BatchState<T>>,
    runner: Arc<dyn BatchRunner<T>>,
    config: BatchConfig,
    stats: Arc<StoreStats>,
}

/// Coalesces concurrent calls into shared transactions.
pub struct Batcher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> std::fmt::Debug for Batcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl<T: Record> Batcher<T> {
    /// Creates a batcher running its transactions through `runner`.
    ///
    /// Limits come from `config`, which should already have its defaults
    /// applied.
    pub fn new(runner: Arc<dyn BatchRunner<T>>, config: &Config, stats: Arc<StoreStats>) -> Self {
        let config = BatchConfig {
            max_calls: config.max_batch_calls.max(1),
            max_duration: config.max_batch_duration,
            retry: config.retry_batch_fail,
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(BatchState {
                    calls: Vec::new(),
                    timer: None,
                    generation: 0,
                }),
                runner,
                config,
                stats,
            }),
        }
    }

    /// Adds calls to the pending batch.
    ///
    /// Reaching `max_batch_calls` flushes the batch on this thread before
    /// returning. Otherwise the first call of a batch arms the flush timer.
    pub fn append(&self, calls: impl IntoIterator<Item = Call<T>>) {
        let shared = &self.shared;
        let mut state = shared.state.lock();

        let before = state.calls.len();
        state.calls.extend(calls);
        shared.stats.record_calls(state.calls.len() - before);

        if state.calls.len() >= shared.config.max_calls {
            shared.flush(&mut state);
            return;
        }

        if state.timer.is_some() || state.calls.is_empty() {
            return;
        }

        state.generation += 1;
        let generation = state.generation;
        state.timer = Some(generation);

        let timer = Arc::clone(shared);
        let wait = shared.config.max_duration;
        let spawned = thread::Builder::new()
            .name("reldb-batch-timer".to_string())
            .spawn(move || {
                thread::sleep(wait);
                timer.fire(generation);
            });

        if let Err(err) = spawned {
            tracing::warn!(error = %err, "failed to arm batch timer, flushing now");
            shared.flush(&mut state);
        }
    }

    /// Flushes the pending batch now. A flush with no calls does nothing.
    pub fn flush(&self) {
        let mut state = self.shared.state.lock();
        self.shared.flush(&mut state);
    }

    /// Number of calls waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.state.lock().calls.len()
    }
}

impl<T: Record> Shared<T> {
    fn fire(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.timer == Some(generation) {
            tracing::trace!(generation, "batch timer fired");
            self.flush(&mut state);
        }
    }

    fn flush(&self, state: &mut BatchState<T>) {
        state.timer = None;
        if state.calls.is_empty() {
            return;
        }

        self.stats.record_flush();
        tracing::debug!(calls = state.calls.len(), "flushing batch");

        self.run(&mut state.calls);
        state.calls.clear();
    }

    fn run(&self, calls: &mut [Call<T>]) {
        if calls.is_empty() {
            return;
        }

        self.stats.record_batch_transaction();
        let mut failure: Option<(usize, CoreError)> = None;
        let result = self.runner.run_batch(&mut |txn: &mut Transaction<'_, T>| {
            failure = None;
            for (index, call) in calls.iter_mut().enumerate() {
                if let Err(err) = guarded_call(txn, |txn| (call.func)(txn)) {
                    if matches!(err, CoreError::InternalFault { .. }) {
                        self.stats.record_internal_fault();
                    }
                    failure = Some((index, err.clone()));
                    return Err(err);
                }
            }
            Ok(())
        });

        let (index, cause) = match (result, failure) {
            (Err(err), _) if err.is_closed() => {
                tracing::debug!(calls = calls.len(), "store closed during flush");
                notify_all(calls, &Err(CoreError::Closed));
                return;
            }
            (_, Some(failure)) => failure,
            (Ok(()), None) => {
                notify_all(calls, &Ok(()));
                return;
            }
            (Err(err), None) => {
                tracing::warn!(error = %err, calls = calls.len(), "batch transaction failed outside any call");
                notify_all(calls, &Err(err));
                return;
            }
        };

        let (successful, rest) = calls.split_at_mut(index);
        let Some((failed, remaining)) = rest.split_first_mut() else {
            return;
        };

        tracing::debug!(
            index,
            successful = successful.len(),
            remaining = remaining.len(),
            error = %cause,
            "batch call failed, splitting batch"
        );

        if self.config.retry {
            if !successful.is_empty() {
                self.stats.record_retry();
            }
            self.run(successful);
        } else {
            self.stats.record_aborted_calls(successful.len());
            notify_all(successful, &Err(CoreError::batch_aborted(cause.clone())));
        }

        failed.notify(Err(cause));
        self.run(remaining);
    }
}

fn notify_all<T>(calls: &mut [Call<T>], result: &CoreResult<()>) {
    for call in calls {
        call.notify(result.clone());
    }
}
