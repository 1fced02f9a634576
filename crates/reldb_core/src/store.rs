//! The store facade.

use crate::batch::{BatchHandle, BatchRunner, Batcher, Call};
use crate::block::{Block, BlockLog, BlockWriter, NopBlockWriter, PendingBlocks};
use crate::config::{BlockLogMode, Config};
use crate::cursor::EntryCursor;
use crate::error::{CoreError, CoreResult};
use crate::filter::Filter;
use crate::record::Record;
use crate::stats::StoreStats;
use crate::transaction::{guarded_call, Context, Page, Transaction};
use parking_lot::Mutex;
use reldb_storage::{Backend, BackendTxn, FileLog, InMemoryLog, MemoryInitializer};
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::sync::Arc;

struct StoreInner<T> {
    name: String,
    backend: Box<dyn Backend>,
    block_log: Option<BlockLog>,
    ctx: Context,
    /// Held from begin to block-log append, so block sequences follow commit order.
    write_lock: Mutex<()>,
    stats: Arc<StoreStats>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> StoreInner<T> {
    fn update<R>(
        &self,
        f: impl FnOnce(&mut Transaction<'_, T>) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let _writer = self.write_lock.lock();
        let txn = self.backend.begin(true)?;

        match &self.block_log {
            None => self.finish(txn, &mut NopBlockWriter, f),
            Some(log) => {
                let mut pending = PendingBlocks::new(log.next_sequence());
                let value = self.finish(txn, &mut pending, f)?;
                log.append(&pending.into_blocks())?;
                Ok(value)
            }
        }
    }

    fn view<R>(&self, f: impl FnOnce(&Transaction<'_, T>) -> CoreResult<R>) -> CoreResult<R> {
        let mut blocks = NopBlockWriter;
        let txn = Transaction::new(self.backend.begin(false)?, &mut blocks, &self.ctx);
        let result = f(&txn);
        txn.into_inner().rollback()?;
        result
    }

    fn finish<'t, R>(
        &'t self,
        txn: Box<dyn BackendTxn + 't>,
        blocks: &'t mut dyn BlockWriter,
        f: impl FnOnce(&mut Transaction<'_, T>) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let mut transaction = Transaction::new(txn, blocks, &self.ctx);
        let result = f(&mut transaction);
        let txn = transaction.into_inner();

        match result {
            Ok(value) => {
                txn.commit()?;
                self.stats.record_commit();
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback() {
                    tracing::warn!(error = %rollback, store = %self.name, "rollback failed");
                }
                self.stats.record_rollback();
                Err(err)
            }
        }
    }
}

impl<T: Record> BatchRunner<T> for StoreInner<T> {
    fn run_batch(
        &self,
        f: &mut dyn FnMut(&mut Transaction<'_, T>) -> CoreResult<()>,
    ) -> CoreResult<()> {
        self.update(|txn| f(txn))
    }
}

/// An embedded store of `T` records.
///
/// Writes made through [`Store::new_entry`], [`Store::edit`],
/// [`Store::remove`] and [`Store::batch`] are batched: concurrent callers
/// share write transactions. [`Store::transaction`] opens a dedicated write
/// transaction instead.
///
/// # Example
///
/// ```rust,ignore
/// use reldb_core::{Config, Filter, Store};
///
/// let store: Store<Note> = Store::open(Config::default(), ["users"])?;
/// let id = store.new_entry(Note::new("user-1", "hello"))?;
///
/// let page = store.get_filtered(None, &[Filter::matching("users", "user-1")], 10, false)?;
/// assert_eq!(page.last_id.as_deref(), Some(id.as_str()));
/// ```
pub struct Store<T: Record> {
    inner: Arc<StoreInner<T>>,
    batcher: Batcher<T>,
}

impl<T: Record> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("relationship_keys", &self.inner.ctx.relationship_keys)
            .field("block_log", &self.inner.block_log)
            .finish_non_exhaustive()
    }
}

impl<T: Record> Store<T> {
    /// Opens a store with the given relationship keys.
    ///
    /// Defaults are applied to `config` before it is validated. The first
    /// open records `T::TYPE_NAME` as the store's element type; opening the
    /// same backend with another type name fails.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyEncoder` if no encoder is configured,
    /// `CoreError::InvalidType` on an element type mismatch, or an error
    /// opening the backend or block log.
    pub fn open<I, S>(config: Config, relationship_keys: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = config.apply_defaults();
        config.validate()?;

        let encoder = config.encoder.clone().ok_or(CoreError::EmptyEncoder)?;
        let initializer = config
            .initializer
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryInitializer));
        let backend = initializer.open(&config.dir, &config.name)?;

        let block_log = match config.block_log {
            BlockLogMode::Disabled => None,
            BlockLogMode::Memory => Some(BlockLog::open(Box::new(InMemoryLog::new()))?),
            BlockLogMode::File => {
                let file = FileLog::open_with_create_dirs(&config.block_log_path())?;
                Some(BlockLog::open(Box::new(file))?)
            }
        };

        let stats = Arc::new(StoreStats::new());
        let inner = Arc::new(StoreInner {
            name: config.name.clone(),
            backend,
            block_log,
            ctx: Context {
                encoder,
                relationship_keys: relationship_keys.into_iter().map(Into::into).collect(),
                index_length: config.index_length,
            },
            write_lock: Mutex::new(()),
            stats: Arc::clone(&stats),
            _marker: PhantomData,
        });

        inner.update(|txn| txn.check_type())?;

        let runner: Arc<dyn BatchRunner<T>> = inner.clone();
        let batcher = Batcher::new(runner, &config, stats);

        tracing::debug!(
            name = %config.name,
            relationships = ?inner.ctx.relationship_keys,
            block_log = ?config.block_log,
            "store opened"
        );

        Ok(Self { inner, batcher })
    }

    /// Store name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Inserts `entry` and returns its new identifier.
    ///
    /// # Errors
    ///
    /// Returns any error the batched write receives.
    pub fn new_entry(&self, mut entry: T) -> CoreResult<String> {
        self.batch_with(move |txn| txn.new_entry(&mut entry))
    }

    /// Reads the entry stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn get(&self, id: &str) -> CoreResult<T> {
        self.inner.view(|txn| txn.get(id))
    }

    /// Returns true if an entry is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn exists(&self, id: &str) -> CoreResult<bool> {
        self.inner.view(|txn| txn.exists(id))
    }

    /// Replaces the entry stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn edit(&self, id: &str, mut entry: T) -> CoreResult<()> {
        let id = id.to_string();
        self.batch_with(move |txn| txn.edit(&id, &mut entry))
    }

    /// Removes the entry stored under `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EntryNotFound` if there is no such entry.
    pub fn remove(&self, id: &str) -> CoreResult<T> {
        let id = id.to_string();
        self.batch_with(move |txn| txn.remove(&id))
    }

    /// Reads one page of entries accepted by every filter.
    ///
    /// See [`Transaction::get_filtered`].
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RelationshipNotFound` for an undeclared filter key.
    pub fn get_filtered(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        limit: usize,
        reverse: bool,
    ) -> CoreResult<Page<T>> {
        self.inner
            .view(|txn| txn.get_filtered(seek_id, filters, limit, reverse))
    }

    /// Visits entries accepted by every filter.
    ///
    /// # Errors
    ///
    /// Returns the first error from the read or from `f`.
    pub fn for_each<F>(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        reverse: bool,
        f: F,
    ) -> CoreResult<()>
    where
        F: FnMut(&str, T) -> CoreResult<ControlFlow<()>>,
    {
        self.inner
            .view(|txn| txn.for_each(seek_id, filters, reverse, f))
    }

    /// Visits identifiers of entries accepted by every filter.
    ///
    /// # Errors
    ///
    /// Returns the first error from the read or from `f`.
    pub fn for_each_id<F>(
        &self,
        seek_id: Option<&str>,
        filters: &[Filter],
        reverse: bool,
        f: F,
    ) -> CoreResult<()>
    where
        F: FnMut(&str) -> CoreResult<ControlFlow<()>>,
    {
        self.inner
            .view(|txn| txn.for_each_id(seek_id, filters, reverse, f))
    }

    /// Runs `f` with a cursor over every entry.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error opening the cursor.
    pub fn cursor<R>(
        &self,
        f: impl FnOnce(&mut EntryCursor<'_, T>) -> CoreResult<R>,
    ) -> CoreResult<R> {
        self.inner.view(|txn| {
            let mut cursor = txn.cursor()?;
            f(&mut cursor)
        })
    }

    /// Runs `f` in a read transaction.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or `CoreError::Closed`.
    pub fn read_transaction<R>(
        &self,
        f: impl FnOnce(&Transaction<'_, T>) -> CoreResult<R>,
    ) -> CoreResult<R> {
        self.inner.view(f)
    }

    /// Runs `f` in a dedicated write transaction.
    ///
    /// The transaction commits if `f` returns `Ok` and rolls back otherwise.
    /// A panic in `f` rolls back and is reported as
    /// `CoreError::InternalFault`.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or an error opening or committing.
    pub fn transaction(
        &self,
        f: impl FnOnce(&mut Transaction<'_, T>) -> CoreResult<()>,
    ) -> CoreResult<()> {
        self.inner.update(|txn| guarded_call(txn, f))
    }

    /// Submits `f` to the batcher and waits for its result.
    ///
    /// `f` may run more than once; see [`CallFn`](crate::batch::CallFn).
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, a batch-aborted error when a sibling
    /// failed and retries are disabled, or `CoreError::Closed`.
    pub fn batch<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnMut(&mut Transaction<'_, T>) -> CoreResult<()> + Send + 'static,
    {
        self.batch_async(f).wait()
    }

    /// Submits `f` to the batcher and returns a handle to its result.
    pub fn batch_async<F>(&self, f: F) -> BatchHandle
    where
        F: FnMut(&mut Transaction<'_, T>) -> CoreResult<()> + Send + 'static,
    {
        let (call, handle) = Call::new(f);
        self.batcher.append([call]);
        handle
    }

    /// Appends prepared calls to the pending batch.
    ///
    /// Like [`Store::batch_async`] for several calls at once; the calls stay
    /// adjacent and in order within the batch.
    pub fn append(&self, calls: impl IntoIterator<Item = Call<T>>) {
        self.batcher.append(calls);
    }

    /// Flushes pending batched calls now.
    pub fn flush(&self) {
        self.batcher.flush();
    }

    /// Every block in the block log.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidBlockWriter` when block logging is
    /// disabled.
    pub fn export_blocks(&self) -> CoreResult<Vec<Block>> {
        self.inner
            .block_log
            .as_ref()
            .ok_or(CoreError::InvalidBlockWriter)?
            .read_all()
    }

    /// Store statistics.
    #[must_use]
    pub fn stats(&self) -> &StoreStats {
        &self.inner.stats
    }

    /// Flushes pending calls and closes the backend.
    ///
    /// Calls submitted afterwards receive `CoreError::Closed`. Closing twice
    /// is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to close.
    pub fn close(&self) -> CoreResult<()> {
        self.batcher.flush();
        if self.inner.backend.is_closed() {
            return Ok(());
        }

        self.inner.backend.close()?;
        tracing::debug!(name = %self.inner.name, "store closed");
        Ok(())
    }

    fn batch_with<R, F>(&self, mut f: F) -> CoreResult<R>
    where
        R: Send + 'static,
        F: FnMut(&mut Transaction<'_, T>) -> CoreResult<R> + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(None));
        let out = Arc::clone(&slot);
        self.batch(move |txn| {
            let value = f(txn)?;
            *out.lock() = Some(value);
            Ok(())
        })?;

        let value = slot.lock().take();
        value.ok_or_else(|| CoreError::internal_fault("batched call returned no value"))
    }
}
