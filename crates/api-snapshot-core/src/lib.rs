//! # api-snapshot-core
//!
//! Core types for api-snapshot.
//!
//! This crate contains the fundamental types with **no internal dependencies**
//! on other api-snapshot crates. It provides:
//!
//! - Error types
//! - Snapshot configuration (with YAML loading)
//! - Snapshot keys and file layouts
//! - Path resolution from a key to a snapshot file
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;
pub mod layout;
pub mod resolver;

// Re-export commonly used types
pub use config::{LocatorConfig, SnapshotConfig};
pub use error::{Error, Result};
pub use key::SnapshotKey;
pub use layout::{Layout, SNAPSHOT_EXTENSION};
pub use resolver::{PathResolver, SnapshotPath};
