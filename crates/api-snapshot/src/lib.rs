//! # api-snapshot
//!
//! Snapshot assertions for HTTP/API test suites.
//!
//! The first run of an assertion captures the payload as a snapshot file and
//! reports the test as pending review. Later runs compare the payload against
//! the stored snapshot, honouring placeholders such as `@integer@` or
//! `@string@.isDateTime()` that a reviewer put in place of volatile values.
//!
//! ## Overview
//!
//! This crate ties together:
//! - api-snapshot-core: configuration, keys and path resolution
//! - api-snapshot-matcher: pattern-aware JSON comparison
//! - api-snapshot-store: the capture-or-compare protocol over files
//!
//! and adds canonical serialization, test outcomes, the [`assert_snapshot!`]
//! macro and the `api-snapshot` review CLI.
//!
//! ## Example
//!
//! ```no_run
//! use api_snapshot::{assert_snapshot, SnapshotConfig, Snapshotter};
//! use serde_json::json;
//!
//! // `file!()` is relative to the workspace root for a workspace member
//! let workspace_root = concat!(env!("CARGO_MANIFEST_DIR"), "/../..");
//! let snapshots = Snapshotter::new(&SnapshotConfig::source_file(workspace_root))?;
//! assert_snapshot!(snapshots, "users_response_ok", json!({"data": [{"id": 1}]}));
//! # Ok::<(), api_snapshot::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod outcome;
pub mod review;
pub mod snapshotter;

// Re-export commonly used types
pub use api_snapshot_core::{
    Error, Layout, LocatorConfig, PathResolver, Result, SnapshotConfig, SnapshotKey, SnapshotPath,
};
pub use api_snapshot_matcher::{MatchEngine, MatchReport, Mismatch, MismatchKind, PatternMatcher};
pub use api_snapshot_store::{SnapshotFile, SnapshotStore, MARKER};
pub use canonical::{canonicalize_body, to_canonical};
pub use outcome::{
    write_pending_notice, Failure, FailureReason, Outcome, PanicReporter, RecordingReporter,
    Signal, TestReporter,
};
pub use snapshotter::{Snapshotter, TestCase};
