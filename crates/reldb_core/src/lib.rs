//! # RelDB Core
//!
//! An embedded record store with batched writes, relationship indexes and
//! resumable cursors, running on a pluggable key-value backend.
//!
//! ## Overview
//!
//! A [`Store`] holds records of one type. Each record gets a zero-padded
//! identifier on insert and may declare relationships: identifiers it is
//! associated with under a named relationship key. Relationship indexes let
//! reads be scoped with [`Filter`]s and paged in either direction.
//!
//! Writes from concurrent callers are coalesced by the [`Batcher`] into
//! shared transactions. A failing call only fails itself: its siblings are
//! re-run (or told the batch aborted) and the rest of the batch continues.
//!
//! ## Example
//!
//! ```rust
//! use reldb_core::{Config, Filter, Record, Relationships, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Note {
//!     id: String,
//!     user_id: String,
//!     text: String,
//! }
//!
//! impl Record for Note {
//!     const TYPE_NAME: &'static str = "note";
//!
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//!
//!     fn set_id(&mut self, id: String) {
//!         self.id = id;
//!     }
//!
//!     fn relationships(&self) -> Relationships {
//!         Relationships::new().with("users", [&self.user_id])
//!     }
//! }
//!
//! let store: Store<Note> = Store::open(Config::default(), ["users"]).unwrap();
//! let note = Note {
//!     user_id: "user-1".into(),
//!     text: "hello".into(),
//!     ..Note::default()
//! };
//! let id = store.new_entry(note).unwrap();
//!
//! let page = store
//!     .get_filtered(None, &[Filter::matching("users", "user-1")], 10, false)
//!     .unwrap();
//! assert_eq!(page.entries[0].text, "hello");
//! assert_eq!(page.last_id, Some(id));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod block;
mod config;
pub mod cursor;
mod error;
mod filter;
mod id;
mod record;
mod stats;
mod store;
mod transaction;

pub use batch::{BatchHandle, BatchRunner, Batcher, Call, CallFn};
pub use block::{Block, BlockLog, BlockType, BlockWriter, NopBlockWriter, PendingBlocks};
pub use config::{
    BlockLogMode, Config, DEFAULT_INDEX_LENGTH, DEFAULT_MAX_BATCH_CALLS,
    DEFAULT_MAX_BATCH_DURATION, DEFAULT_RETRY_BATCH_FAIL,
};
pub use cursor::{seek, EntryCursor, IdCursor, Seekable};
pub use error::{CoreError, CoreResult};
pub use filter::{Filter, Polarity};
pub use id::{
    format_id, is_valid_relationship_id, join_seek_id, parse_id, split_seek_id, SEEK_SEPARATOR,
};
pub use record::{Record, Relationships};
pub use stats::StoreStats;
pub use store::Store;
pub use transaction::{guarded_call, Page, Transaction};

pub use reldb_codec::{CborEncoder, Encoder, JsonEncoder};
pub use reldb_storage::{Backend, Initializer, MemoryBackend, MemoryInitializer};
