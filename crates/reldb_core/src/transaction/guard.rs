//! Panic guard around caller-supplied transaction functions.

use super::Transaction;
use crate::error::{CoreError, CoreResult};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Runs `f` against `txn`, converting a panic into `CoreError::InternalFault`.
///
/// The result is always either what `f` returned or the converted fault, so
/// a panicking call cannot unwind through the batch runner. The transaction
/// may hold partial writes from the panicking call; callers roll it back
/// like any other failure.
///
/// # Errors
///
/// Returns the error from `f`, or `CoreError::InternalFault` carrying the
/// panic message.
pub fn guarded_call<'t, T, F>(txn: &mut Transaction<'t, T>, f: F) -> CoreResult<()>
where
    F: FnOnce(&mut Transaction<'t, T>) -> CoreResult<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| f(txn))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(%message, "transaction function panicked");
            Err(CoreError::internal_fault(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
