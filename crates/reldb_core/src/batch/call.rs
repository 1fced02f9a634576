//! Calls and their result handles.

use crate::error::{CoreError, CoreResult};
use crate::transaction::Transaction;
use std::sync::mpsc;
use std::time::Duration;

/// A transaction function submitted to the batcher.
///
/// The function may run more than once: when a sibling fails, a call that
/// already succeeded is re-run in a fresh transaction (unless retries are
/// disabled). It must produce the same writes every time it runs against the
/// same state, and must not have side effects outside the transaction.
pub type CallFn<T> = Box<dyn FnMut(&mut Transaction<'_, T>) -> CoreResult<()> + Send>;

/// One unit of batched work and the channel its result goes to.
pub struct Call<T> {
    pub(crate) func: CallFn<T>,
    result: Option<mpsc::Sender<CoreResult<()>>>,
}

impl<T> Call<T> {
    /// Creates a call and the handle its result will be delivered to.
    pub fn new<F>(func: F) -> (Self, BatchHandle)
    where
        F: FnMut(&mut Transaction<'_, T>) -> CoreResult<()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let call = Self {
            func: Box::new(func),
            result: Some(tx),
        };
        (call, BatchHandle { rx })
    }

    /// Delivers the call's result. Only the first notification is sent.
    pub(crate) fn notify(&mut self, result: CoreResult<()>) {
        if let Some(tx) = self.result.take() {
            // The caller may have dropped its handle.
            let _ = tx.send(result);
        }
    }
}

impl<T> std::fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Call")
            .field("notified", &self.result.is_none())
            .finish_non_exhaustive()
    }
}

/// Receives the result of one batched call.
#[derive(Debug)]
pub struct BatchHandle {
    rx: mpsc::Receiver<CoreResult<()>>,
}

impl BatchHandle {
    /// Blocks until the call's result arrives.
    ///
    /// # Errors
    ///
    /// Returns the call's error, a batch-aborted error, the closed error, or
    /// `CoreError::InternalFault` if the call was dropped without a result.
    pub fn wait(self) -> CoreResult<()> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(dropped()))
    }

    /// Waits up to `timeout` for the result. Returns `None` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<CoreResult<()>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(dropped())),
        }
    }

    /// Returns the result if it has already arrived.
    pub fn try_result(&self) -> Option<CoreResult<()>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(dropped())),
        }
    }
}

fn dropped() -> CoreError {
    CoreError::internal_fault("call dropped without a result")
}
