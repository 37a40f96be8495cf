//! # api-snapshot-matcher
//!
//! Pattern-aware comparison engine for api-snapshot.
//!
//! This crate provides:
//! - The [`MatchEngine`] trait the snapshot store delegates comparison to
//! - [`PatternMatcher`], a structural JSON matcher
//! - The placeholder language (`@string@`, `@integer@.greaterThan(0)`, ...)
//! - Match reports with the location of every mismatch
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on api-snapshot-core only.
//!
//! ## Example
//!
//! ```
//! use api_snapshot_matcher::{MatchEngine, PatternMatcher};
//!
//! let stored = r#"{"id": "@integer@", "createdAt": "@string@.isDateTime()"}"#;
//! let actual = r#"{"id": 52, "createdAt": "2024-05-01T12:00:00+00:00"}"#;
//!
//! let report = PatternMatcher::new().compare(stored, actual).unwrap();
//! assert!(report.is_match());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod expander;
pub mod matcher;
pub mod pattern;
pub mod report;
pub mod value;

// Re-export commonly used types
pub use expander::Expander;
pub use matcher::{MatchEngine, PatternMatcher};
pub use pattern::{Pattern, TextPattern, ValueType, UNBOUNDED_ARRAY};
pub use report::{MatchReport, Mismatch, MismatchKind};
