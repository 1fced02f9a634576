//! # RelDB Testkit
//!
//! Test utilities for RelDB.
//!
//! This crate provides:
//! - A sample record type and store fixtures
//! - Property-based test generators using proptest
//! - Canned batch calls (failing, panicking, order-recording)
//! - Concurrent batch stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reldb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_temp_store(|store| {
//!         let id = store.new_entry(Note::new("user-1", "hello")).unwrap();
//!         assert!(store.exists(&id).unwrap());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod calls;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calls::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use calls::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
