//! Canned batch calls.
//!
//! Helpers that build [`Call`]s with known outcomes, for exercising the
//! batch run protocol through a store or a bare [`Batcher`](reldb_core::Batcher).

use crate::fixtures::Note;
use reldb_core::{BatchHandle, Call, CoreError};
use std::sync::{Arc, Mutex};

/// A call inserting a note and succeeding.
pub fn insert_call(note: Note) -> (Call<Note>, BatchHandle) {
    Call::new(move |txn| {
        let mut note = note.clone();
        txn.new_entry(&mut note).map(|_| ())
    })
}

/// A call inserting a note and then failing with `CoreError::Aborted`.
///
/// The insert is rolled back with the rest of the transaction.
pub fn failing_call(reason: &'static str) -> (Call<Note>, BatchHandle) {
    Call::new(move |txn| {
        txn.new_entry(&mut Note::new("doomed", reason))?;
        Err(CoreError::aborted(reason))
    })
}

/// A call that panics with `message`.
pub fn panicking_call(message: &'static str) -> (Call<Note>, BatchHandle) {
    Call::new(move |_| panic!("{message}"))
}

/// Records the label of every call it hands out, each time that call runs.
#[derive(Debug, Clone, Default)]
pub struct RunRecorder {
    runs: Arc<Mutex<Vec<usize>>>,
}

impl RunRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A call that records `label` and succeeds.
    pub fn call(&self, label: usize) -> (Call<Note>, BatchHandle) {
        self.call_with(label, None)
    }

    /// A call that records `label` and fails with `reason`.
    pub fn failing(&self, label: usize, reason: &'static str) -> (Call<Note>, BatchHandle) {
        self.call_with(label, Some(reason))
    }

    fn call_with(&self, label: usize, reason: Option<&'static str>) -> (Call<Note>, BatchHandle) {
        let runs = Arc::clone(&self.runs);
        Call::new(move |_| {
            runs.lock().expect("recorder poisoned").push(label);
            match reason {
                Some(reason) => Err(CoreError::aborted(reason)),
                None => Ok(()),
            }
        })
    }

    /// Labels in the order the calls ran.
    pub fn runs(&self) -> Vec<usize> {
        self.runs.lock().expect("recorder poisoned").clone()
    }
}

/// Splits `(call, handle)` pairs into calls to append and handles to wait on.
pub fn unzip_calls(
    pairs: impl IntoIterator<Item = (Call<Note>, BatchHandle)>,
) -> (Vec<Call<Note>>, Vec<BatchHandle>) {
    pairs.into_iter().unzip()
}
