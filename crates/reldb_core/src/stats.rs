//! Store statistics.
//!
//! Counters are atomic and can be read while batches are running. All values
//! only ever increase.
//!
//! ```rust,ignore
//! let stats = store.stats();
//! println!("flushes: {}", stats.flushes());
//! println!("retries: {}", stats.retries());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Store statistics.
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Batches flushed, counting every non-empty flush once.
    flushes: AtomicU64,
    /// Calls appended to the batcher.
    calls: AtomicU64,
    /// Transactions opened by the batch runner, including retries.
    batch_transactions: AtomicU64,
    /// Successful prefixes re-run after a sibling failed.
    retries: AtomicU64,
    /// Calls told that their batch was aborted by a sibling.
    aborted_calls: AtomicU64,
    /// Calls that panicked.
    internal_faults: AtomicU64,
    /// Transactions committed through the store.
    commits: AtomicU64,
    /// Transactions rolled back through the store.
    rollbacks: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_calls(&self, count: usize) {
        self.calls.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_batch_transaction(&self) {
        self.batch_transactions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_aborted_calls(&self, count: usize) {
        self.aborted_calls.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_internal_fault(&self) {
        self.internal_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of non-empty flushes.
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Returns the number of calls appended to the batcher.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions the batch runner opened.
    pub fn batch_transactions(&self) -> u64 {
        self.batch_transactions.load(Ordering::Relaxed)
    }

    /// Returns the number of retried prefixes.
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Returns the number of calls that received a batch-aborted error.
    pub fn aborted_calls(&self) -> u64 {
        self.aborted_calls.load(Ordering::Relaxed)
    }

    /// Returns the number of calls that panicked.
    pub fn internal_faults(&self) -> u64 {
        self.internal_faults.load(Ordering::Relaxed)
    }

    /// Returns the number of committed transactions.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Returns the number of rolled back transactions.
    pub fn rollbacks(&self) -> u64 {
        self.rollbacks.load(Ordering::Relaxed)
    }
}
