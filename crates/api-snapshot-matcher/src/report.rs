//! Match reports.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes what differs at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchKind {
    /// Literal values differ
    ValueDiffers {
        /// Stored value
        expected: Value,
        /// Produced value
        actual: Value,
    },
    /// JSON types differ (object vs array, string vs number, ...)
    TypeDiffers {
        /// Stored type
        expected: String,
        /// Produced type
        actual: String,
    },
    /// Key present in the snapshot but missing from the actual payload
    MissingKey,
    /// Key present in the actual payload but not in the snapshot
    UnexpectedKey {
        /// The unexpected value
        actual: Value,
    },
    /// Arrays have different lengths
    LengthDiffers {
        /// Stored length (minimum length for unbounded arrays)
        expected: usize,
        /// Produced length
        actual: usize,
    },
    /// A placeholder rejected the actual value
    PatternFailed {
        /// Placeholder source
        pattern: String,
        /// Produced value
        actual: Value,
        /// Why the placeholder rejected it
        reason: String,
    },
}

/// A mismatch at one structural location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Location such as `data[0].id` (`$` for the root)
    pub path: String,
    /// What differs
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MismatchKind::ValueDiffers { expected, actual } => {
                write!(f, "{}: expected {}, got {}", self.path, expected, actual)
            }
            MismatchKind::TypeDiffers { expected, actual } => {
                write!(f, "{}: expected {}, got {}", self.path, expected, actual)
            }
            MismatchKind::MissingKey => write!(f, "{}: missing", self.path),
            MismatchKind::UnexpectedKey { actual } => {
                write!(f, "{}: unexpected key with value {}", self.path, actual)
            }
            MismatchKind::LengthDiffers { expected, actual } => write!(
                f,
                "{}: expected {} elements, got {}",
                self.path, expected, actual
            ),
            MismatchKind::PatternFailed {
                pattern, reason, ..
            } => write!(f, "{}: {} does not match ({})", self.path, pattern, reason),
        }
    }
}

/// Result of comparing a stored snapshot with an actual payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Every mismatch found, in document order
    pub mismatches: Vec<Mismatch>,
}

impl MatchReport {
    /// Check if the payload matched.
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Get total number of differences.
    pub fn diff_count(&self) -> usize {
        self.mismatches.len()
    }

    /// First mismatch, if any.
    pub fn first(&self) -> Option<&Mismatch> {
        self.mismatches.first()
    }

    /// Paths of all mismatches.
    pub fn paths(&self) -> Vec<&str> {
        self.mismatches.iter().map(|m| m.path.as_str()).collect()
    }

    /// Generate a one-line summary.
    pub fn summary(&self) -> String {
        match self.mismatches.as_slice() {
            [] => "Snapshots match".to_string(),
            [only] => format!("1 difference at {}", only.path),
            [first, rest @ ..] => format!(
                "{} differences, first at {}",
                rest.len() + 1,
                first.path
            ),
        }
    }

    pub(crate) fn push(&mut self, path: &str, kind: MismatchKind) {
        self.mismatches.push(Mismatch {
            path: if path.is_empty() {
                "$".to_string()
            } else {
                path.to_string()
            },
            kind,
        });
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for mismatch in &self.mismatches {
            writeln!(f, "  - {mismatch}")?;
        }
        Ok(())
    }
}
