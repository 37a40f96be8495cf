//! # api-snapshot-store
//!
//! Snapshot storage for api-snapshot.
//!
//! This crate provides:
//! - The on-disk snapshot format (review marker line + canonical payload)
//! - [`SnapshotStore`], which captures a snapshot on first run and reads it
//!   back for comparison afterwards
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on api-snapshot-core for
//! paths and errors and on api-snapshot-matcher for comparison.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod store;

// Re-export commonly used types
pub use file::{SnapshotFile, MARKER};
pub use store::{Fetched, SnapshotStore};
