//! Snapshot outcomes and how they reach the test runner.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use difference::{Changeset, Difference};
use tracing::warn;

use api_snapshot_core::SnapshotPath;
use api_snapshot_matcher::MatchReport;

/// Result of one snapshot assertion.
///
/// `Pending` is neither a pass nor a failure: the baseline was just captured
/// and waits for a human to review it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Actual payload matched the stored snapshot
    Passed,
    /// Snapshot was created by this run
    Pending(String),
    /// Actual payload did not match, or the snapshot was rejected
    Failed(Failure),
}

impl Outcome {
    /// Check if the assertion passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Check if the assertion is inconclusive.
    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    /// Check if the assertion failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// A failed snapshot assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Snapshot file involved
    pub path: SnapshotPath,
    /// Why it failed
    pub reason: FailureReason,
}

/// Why a snapshot assertion failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Actual payload differs from the snapshot
    Mismatch {
        /// Structural mismatches
        report: MatchReport,
        /// Line diff of stored body against actual payload
        diff: String,
    },
    /// Snapshot still carries the review marker and unreviewed snapshots are rejected
    Unreviewed,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            FailureReason::Mismatch { report, diff } => {
                writeln!(f, "Snapshot is not equal. File {}", self.path)?;
                write!(f, "{report}")?;
                if !diff.is_empty() {
                    writeln!(f, "--- expected\n+++ actual")?;
                    write!(f, "{diff}")?;
                }
                Ok(())
            }
            FailureReason::Unreviewed => write!(
                f,
                "Snapshot {} has not been reviewed: delete its first line once the content is correct",
                self.path
            ),
        }
    }
}

/// Render a line diff of `expected` against `actual`, prefixing lines with `-`, `+` or a space.
pub fn line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = String::new();
    for diff in &changeset.diffs {
        let (prefix, text) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Add(x) => ('+', x),
            Difference::Rem(x) => ('-', x),
        };
        for line in text.split('\n') {
            out.push(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// The two signals a snapshot assertion sends to the host test runner.
pub trait TestReporter: Send + Sync {
    /// Mark the current test as inconclusive.
    fn pending(&self, message: &str);

    /// Fail the current test.
    fn fail(&self, message: &str);
}

/// Reporter for the built-in test harness.
///
/// The harness cannot skip a test once it runs, so a pending outcome is
/// logged and written straight to the process stderr, past the harness's
/// output capture, and the test continues. Failures panic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

/// Write the pending notice shown by [`PanicReporter`].
pub fn write_pending_notice<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "pending: {message}")?;
    out.flush()
}

impl TestReporter for PanicReporter {
    fn pending(&self, message: &str) {
        warn!("{}", message);
        // eprintln! is captured by libtest for passing tests
        if let Err(e) = write_pending_notice(&mut io::stderr().lock(), message) {
            warn!("Failed to write pending notice: {}", e);
        }
    }

    fn fail(&self, message: &str) {
        panic!("{message}");
    }
}

/// One signal captured by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// [`TestReporter::pending`] was called
    Pending(String),
    /// [`TestReporter::fail`] was called
    Failed(String),
}

/// Reporter that records signals instead of acting on them.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals received so far.
    pub fn signals(&self) -> Vec<Signal> {
        self.signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, signal: Signal) {
        self.signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(signal);
    }
}

impl TestReporter for RecordingReporter {
    fn pending(&self, message: &str) {
        self.record(Signal::Pending(message.to_string()));
    }

    fn fail(&self, message: &str) {
        self.record(Signal::Failed(message.to_string()));
    }
}
