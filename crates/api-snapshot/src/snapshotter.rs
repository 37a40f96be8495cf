//! Snapshot assertions: resolve, capture or compare, report.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use api_snapshot_core::{PathResolver, Result, SnapshotConfig, SnapshotKey, SnapshotPath};
use api_snapshot_store::{Fetched, SnapshotStore};

use crate::canonical::{canonicalize_body, to_canonical};
use crate::outcome::{line_diff, Failure, FailureReason, Outcome, PanicReporter, TestReporter};

/// One test invocation: its snapshot key and, optionally, its suite's source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Snapshot identity
    pub key: SnapshotKey,
    /// Source file of the suite, needed by the source-file locator
    pub source_file: Option<PathBuf>,
}

impl TestCase {
    /// Create a test case for `suite` and `case`.
    pub fn new(suite: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            key: SnapshotKey::new(suite, case),
            source_file: None,
        }
    }

    /// Append a data-set name for parameterized tests.
    pub fn with_data_set(mut self, data_set: impl AsRef<str>) -> Self {
        self.key = self.key.with_data_set(data_set);
        self
    }

    /// Attach the suite's source file (usually `file!()`).
    pub fn with_source_file(mut self, source_file: impl Into<PathBuf>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }
}

/// Entry point for snapshot assertions.
///
/// Built once per suite from a [`SnapshotConfig`]; configuration problems
/// surface here rather than in individual assertions.
///
/// ```no_run
/// use api_snapshot::{SnapshotConfig, Snapshotter, TestCase};
/// use serde_json::json;
///
/// let snapshots = Snapshotter::new(&SnapshotConfig::namespace(
///     "tests::",
///     concat!(env!("CARGO_MANIFEST_DIR"), "/tests"),
/// ))?;
///
/// let case = TestCase::new("tests::functional::users", "users_response_ok");
/// snapshots.assert_json(&case, &json!({"data": [{"id": 1, "name": "Joe"}]}))?;
/// # Ok::<(), api_snapshot::Error>(())
/// ```
#[derive(Clone)]
pub struct Snapshotter {
    resolver: PathResolver,
    store: SnapshotStore,
    reporter: Arc<dyn TestReporter>,
    reject_unreviewed: bool,
}

impl Snapshotter {
    /// Build a snapshotter with the default store and [`PanicReporter`].
    pub fn new(config: &SnapshotConfig) -> Result<Self> {
        Ok(Self {
            resolver: PathResolver::new(config)?,
            store: SnapshotStore::new(),
            reporter: Arc::new(PanicReporter),
            reject_unreviewed: config.reject_unreviewed,
        })
    }

    /// Use a different store (for a custom match engine).
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = store;
        self
    }

    /// Use a different test-runner reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn TestReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Snapshot path for `case`.
    pub fn path_for(&self, case: &TestCase) -> Result<SnapshotPath> {
        self.resolver.resolve(&case.key, case.source_file.as_deref())
    }

    /// Run the capture-or-compare protocol on canonical text without reporting.
    pub fn check(&self, case: &TestCase, actual: &str) -> Result<Outcome> {
        let path = self.path_for(case)?;

        let file = match self.store.capture_or_fetch(&path, actual)? {
            Fetched::Created { path } => {
                return Ok(Outcome::Pending(format!("⚠️Snapshot created {path}")));
            }
            Fetched::Existing { file, .. } => file,
        };

        if self.reject_unreviewed && !file.is_reviewed() {
            return Ok(Outcome::Failed(Failure {
                path,
                reason: FailureReason::Unreviewed,
            }));
        }

        let report = self.store.compare(&path, &file.render(), actual)?;
        if report.is_match() {
            debug!("Snapshot matched: {}", path);
            return Ok(Outcome::Passed);
        }

        Ok(Outcome::Failed(Failure {
            reason: FailureReason::Mismatch {
                report,
                diff: line_diff(file.body(), actual),
            },
            path,
        }))
    }

    /// Assert canonical text against the snapshot and report the outcome.
    ///
    /// Mismatches and captures go to the reporter; errors are returned.
    pub fn assert_text(&self, case: &TestCase, actual: &str) -> Result<Outcome> {
        let outcome = self.check(case, actual)?;
        match &outcome {
            Outcome::Passed => {}
            Outcome::Pending(message) => {
                warn!("{} ({})", message, case.key);
                self.reporter.pending(message);
            }
            Outcome::Failed(failure) => self.reporter.fail(&failure.to_string()),
        }
        Ok(outcome)
    }

    /// Assert a serializable payload against the snapshot.
    ///
    /// The payload is serialized before any file is touched, so an
    /// unserializable payload never creates a snapshot.
    pub fn assert_serialize<T: Serialize + ?Sized>(
        &self,
        case: &TestCase,
        value: &T,
    ) -> Result<Outcome> {
        let actual = to_canonical(value)?;
        self.assert_text(case, &actual)
    }

    /// Assert a decoded JSON document against the snapshot.
    pub fn assert_json(&self, case: &TestCase, value: &Value) -> Result<Outcome> {
        self.assert_serialize(case, value)
    }

    /// Assert a raw JSON response body against the snapshot.
    pub fn assert_response_body(&self, case: &TestCase, body: &str) -> Result<Outcome> {
        let actual = canonicalize_body(body)?;
        self.assert_text(case, &actual)
    }

    /// Explicitly regenerate the snapshot for `case` from `value`.
    ///
    /// The new file carries the review marker again.
    pub fn regenerate<T: Serialize + ?Sized>(
        &self,
        case: &TestCase,
        value: &T,
    ) -> Result<SnapshotPath> {
        let actual = to_canonical(value)?;
        let path = self.path_for(case)?;
        self.store.overwrite(&path, &actual)?;
        Ok(path)
    }
}

/// Assert a serializable value against its snapshot.
///
/// The suite is the calling module (`module_path!()`) and the suite's source
/// file is `file!()`; the case name is given explicitly. Snapshot errors panic.
///
/// ```ignore
/// let outcome = assert_snapshot!(snapshots, "users_response_ok", response);
/// let outcome = assert_snapshot!(snapshots, "users_by_role", response, data_set = "admin");
/// ```
#[macro_export]
macro_rules! assert_snapshot {
    ($snapshotter:expr, $case:expr, $value:expr, data_set = $data_set:expr $(,)?) => {{
        let case = $crate::TestCase::new(module_path!(), $case)
            .with_data_set($data_set)
            .with_source_file(file!());
        match $snapshotter.assert_serialize(&case, &$value) {
            Ok(outcome) => outcome,
            Err(err) => panic!("snapshot error: {err}"),
        }
    }};
    ($snapshotter:expr, $case:expr, $value:expr $(,)?) => {{
        let case = $crate::TestCase::new(module_path!(), $case).with_source_file(file!());
        match $snapshotter.assert_serialize(&case, &$value) {
            Ok(outcome) => outcome,
            Err(err) => panic!("snapshot error: {err}"),
        }
    }};
}
