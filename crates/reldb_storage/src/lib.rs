//! # RelDB Storage
//!
//! Storage abstractions consumed by the RelDB core.
//!
//! This crate provides two independent kinds of storage:
//!
//! - **Key-value backends** ([`Backend`]): ordered byte keys grouped into
//!   buckets, accessed through read or write transactions and walked with
//!   [`RawCursor`]s. The core keeps entries, relationship indexes and
//!   metadata here.
//! - **Log sinks** ([`LogBackend`]): opaque append-only byte stores used by
//!   the block log for durability and export.
//!
//! Neither kind interprets the bytes it stores.
//!
//! ## Available Implementations
//!
//! - [`MemoryBackend`] - ordered in-memory key-value backend
//! - [`InMemoryLog`] - in-memory log sink for tests
//! - [`FileLog`] - persistent, exclusively locked log file
//!
//! ## Example
//!
//! ```rust
//! use reldb_storage::{Backend, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//! let mut txn = backend.begin(true).unwrap();
//! txn.put(b"entries", b"00000001", b"{}").unwrap();
//! txn.commit().unwrap();
//!
//! let txn = backend.begin(false).unwrap();
//! assert_eq!(txn.get(b"entries", b"00000001").unwrap(), Some(b"{}".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod kv;
mod log;
mod memory;
mod memory_kv;

pub use error::{StorageError, StorageResult};
pub use file::FileLog;
pub use kv::{Backend, BackendTxn, Initializer, KeyValue, RawCursor};
pub use log::LogBackend;
pub use memory::InMemoryLog;
pub use memory_kv::{MemoryBackend, MemoryInitializer};
