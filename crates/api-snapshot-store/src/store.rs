//! Capture-or-compare protocol over snapshot files.
//!
//! Per snapshot path and test run:
//!
//! ```text
//! ABSENT  --capture-->        CREATED (pending review)
//! PRESENT --compare match-->  PASS
//! PRESENT --compare differ--> FAIL
//! ```
//!
//! An existing snapshot is never rewritten by this protocol. Regeneration is
//! the separate, explicit [`SnapshotStore::overwrite`].

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use api_snapshot_core::{Error, Result, SnapshotPath};
use api_snapshot_matcher::{MatchEngine, MatchReport, PatternMatcher};

use crate::file::SnapshotFile;

/// Outcome of [`SnapshotStore::capture_or_fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// No snapshot existed; the actual content was written as the new baseline.
    Created {
        /// Location of the new snapshot
        path: SnapshotPath,
    },
    /// A snapshot already existed and was read for comparison.
    Existing {
        /// Location of the snapshot
        path: SnapshotPath,
        /// Stored snapshot
        file: SnapshotFile,
    },
}

impl Fetched {
    /// Whether the snapshot was written during this call.
    pub fn was_created(&self) -> bool {
        matches!(self, Fetched::Created { .. })
    }

    /// Snapshot location.
    pub fn path(&self) -> &SnapshotPath {
        match self {
            Fetched::Created { path } | Fetched::Existing { path, .. } => path,
        }
    }

    /// Stored snapshot, when one existed before this call.
    pub fn expected(&self) -> Option<&SnapshotFile> {
        match self {
            Fetched::Created { .. } => None,
            Fetched::Existing { file, .. } => Some(file),
        }
    }
}

/// Reads, writes and compares snapshot files.
///
/// Comparison is delegated to a [`MatchEngine`]; [`PatternMatcher`] is used
/// unless another engine is injected.
#[derive(Clone)]
pub struct SnapshotStore {
    engine: Arc<dyn MatchEngine>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Create a store using the default pattern matcher.
    pub fn new() -> Self {
        Self::with_engine(Arc::new(PatternMatcher::new()))
    }

    /// Create a store using a custom comparison engine.
    pub fn with_engine(engine: Arc<dyn MatchEngine>) -> Self {
        Self { engine }
    }

    /// Write `actual` as a new snapshot if none exists, otherwise read the stored one.
    ///
    /// Creation is create-exclusive: the content is staged in a temporary file
    /// next to the target and linked into place only if the target is still
    /// absent. When another writer wins that race, its snapshot is read back
    /// and returned as [`Fetched::Existing`].
    pub fn capture_or_fetch(&self, path: &SnapshotPath, actual: &str) -> Result<Fetched> {
        if let Some(file) = self.try_read(path)? {
            debug!("Snapshot found: {}", path);
            return Ok(Fetched::Existing {
                path: path.clone(),
                file,
            });
        }

        let rendered = SnapshotFile::captured(actual).render();
        if write_new(path.as_path(), &rendered)? {
            info!("Snapshot created: {}", path);
            return Ok(Fetched::Created { path: path.clone() });
        }

        debug!("Snapshot created concurrently, reading it back: {}", path);
        let file = self.read(path)?;
        Ok(Fetched::Existing {
            path: path.clone(),
            file,
        })
    }

    /// Read an existing snapshot.
    pub fn read(&self, path: &SnapshotPath) -> Result<SnapshotFile> {
        self.try_read(path)?.ok_or_else(|| {
            Error::fs(
                path,
                io::Error::new(io::ErrorKind::NotFound, "snapshot file does not exist"),
            )
        })
    }

    /// Compare stored file content with actual content.
    ///
    /// `expected` is the raw file content; the marker line, if still present,
    /// is not part of the comparison.
    pub fn compare(&self, path: &SnapshotPath, expected: &str, actual: &str) -> Result<MatchReport> {
        let file = SnapshotFile::parse(expected);
        self.engine
            .compare(file.body(), actual)
            .map_err(|e| match e {
                Error::InvalidSnapshot { reason, .. } => Error::InvalidSnapshot {
                    path: path.as_path().to_path_buf(),
                    reason,
                },
                other => other,
            })
    }

    /// Replace a snapshot with `actual`, marking it for review again.
    ///
    /// This is the explicit regeneration action; the capture-or-compare
    /// protocol never calls it.
    pub fn overwrite(&self, path: &SnapshotPath, actual: &str) -> Result<()> {
        let target = path.as_path();
        let tmp = stage(target, &SnapshotFile::captured(actual).render())?;
        tmp.persist(target).map_err(|e| Error::fs(target, e.error))?;
        info!("Snapshot regenerated: {}", path);
        Ok(())
    }

    fn try_read(&self, path: &SnapshotPath) -> Result<Option<SnapshotFile>> {
        match fs::read_to_string(path.as_path()) {
            Ok(content) => Ok(Some(SnapshotFile::parse(&content))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::fs(path, e)),
        }
    }
}

/// Write `content` to `target` unless it exists. Returns `false` when it did.
fn write_new(target: &Path, content: &str) -> Result<bool> {
    let tmp = stage(target, content)?;
    match tmp.persist_noclobber(target) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(Error::fs(target, e.error)),
    }
}

/// Stage `content` in a synced temporary file in the target's directory.
fn stage(target: &Path, content: &str) -> Result<NamedTempFile> {
    let dir = parent_dir(target);
    ensure_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::fs(dir, e))?;
    tmp.write_all(content.as_bytes())
        .and_then(|()| share_with_group_and_others(&tmp))
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::fs(target, e))?;
    Ok(tmp)
}

/// Mode of snapshot files. Temp files start out owner-only.
#[cfg(unix)]
const SNAPSHOT_MODE: u32 = 0o644;

#[cfg(unix)]
fn share_with_group_and_others(tmp: &NamedTempFile) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(SNAPSHOT_MODE))
}

#[cfg(not(unix))]
fn share_with_group_and_others(_tmp: &NamedTempFile) -> io::Result<()> {
    Ok(())
}

/// Create `dir` and its parents, tolerating a concurrent creator.
fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if let Err(e) = fs::create_dir_all(dir) {
        if dir.is_dir() {
            warn!("Snapshot directory created concurrently: {}", dir.display());
            return Ok(());
        }
        return Err(Error::fs(dir, e));
    }
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::file::MARKER;

    const PAYLOAD: &str = "{\n    \"data\": [\n        {\n            \"id\": 1,\n            \"name\": \"Joe\"\n        }\n    ]\n}";

    fn snapshot_path(dir: &TempDir) -> SnapshotPath {
        SnapshotPath::new(dir.path().join("users_snapshots").join("list.json"))
    }

    #[test]
    fn test_first_run_creates_file_and_directories() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        let fetched = store.capture_or_fetch(&path, PAYLOAD).unwrap();
        assert!(fetched.was_created());
        assert!(fetched.expected().is_none());

        let content = fs::read_to_string(path.as_path()).unwrap();
        assert_eq!(content, format!("{MARKER}\n{PAYLOAD}"));
    }

    #[test]
    fn test_existing_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        fs::create_dir_all(path.as_path().parent().unwrap()).unwrap();

        let fetched = SnapshotStore::new().capture_or_fetch(&path, PAYLOAD).unwrap();
        assert!(fetched.was_created());
    }

    #[test]
    fn test_second_run_reads_existing() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        store.capture_or_fetch(&path, PAYLOAD).unwrap();
        let fetched = store.capture_or_fetch(&path, "{\"other\": true}").unwrap();

        assert!(!fetched.was_created());
        let file = fetched.expected().unwrap();
        assert!(!file.is_reviewed());
        assert_eq!(file.body(), PAYLOAD);

        // The stored snapshot is never rewritten by capture_or_fetch
        let content = fs::read_to_string(path.as_path()).unwrap();
        assert_eq!(content, format!("{MARKER}\n{PAYLOAD}"));
    }

    #[test]
    fn test_compare_ignores_marker() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        let report = store
            .compare(&path, &format!("{MARKER}\n{PAYLOAD}"), PAYLOAD)
            .unwrap();
        assert!(report.is_match());
    }

    #[test]
    fn test_compare_reports_mismatch_location() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        let actual = PAYLOAD.replace("\"id\": 1", "\"id\": 2");
        let report = store.compare(&path, PAYLOAD, &actual).unwrap();
        assert_eq!(report.paths(), vec!["data[0].id"]);
    }

    #[test]
    fn test_invalid_snapshot_names_path() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let err = SnapshotStore::new()
            .compare(&path, "{ not json", PAYLOAD)
            .unwrap_err();
        match err {
            Error::InvalidSnapshot { path: reported, .. } => {
                assert_eq!(reported, path.as_path())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let err = SnapshotStore::new().read(&path).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
        assert!(err.to_string().contains("list.json"));
    }

    #[test]
    fn test_overwrite_replaces_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        store.capture_or_fetch(&path, PAYLOAD).unwrap();
        store.overwrite(&path, "{\"id\": 2}").unwrap();

        let file = store.read(&path).unwrap();
        assert_eq!(file.body(), "{\"id\": 2}");
        assert!(!file.is_reviewed());
    }

    #[test]
    fn test_no_temporary_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        store.capture_or_fetch(&path, PAYLOAD).unwrap();
        store.overwrite(&path, PAYLOAD).unwrap();

        let entries: Vec<_> = fs::read_dir(path.as_path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("list.json")]);
    }

    #[test]
    fn test_lost_race_reads_winner() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        fs::create_dir_all(path.as_path().parent().unwrap()).unwrap();
        fs::write(path.as_path(), "{\"winner\": true}").unwrap();

        assert!(!write_new(path.as_path(), "{\"loser\": true}").unwrap());
        let file = SnapshotStore::new().read(&path).unwrap();
        assert_eq!(file.body(), "{\"winner\": true}");
    }

    #[test]
    fn test_concurrent_capture_single_winner() {
        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();

        let created: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = store.clone();
                    let path = path.clone();
                    scope.spawn(move || {
                        let payload = format!("{{\"writer\": {i}}}");
                        store.capture_or_fetch(&path, &payload).unwrap().was_created() as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(created, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = snapshot_path(&dir);
        let store = SnapshotStore::new();
        let mode = |path: &SnapshotPath| {
            fs::metadata(path.as_path()).unwrap().permissions().mode() & 0o777
        };

        store.capture_or_fetch(&path, PAYLOAD).unwrap();
        assert_eq!(mode(&path), SNAPSHOT_MODE);

        store.overwrite(&path, "{}").unwrap();
        assert_eq!(mode(&path), SNAPSHOT_MODE);
    }

    #[test]
    fn test_uncreatable_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let path = SnapshotPath::new(blocker.join("users_snapshots").join("list.json"));

        let err = SnapshotStore::new().capture_or_fetch(&path, PAYLOAD).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }
}
