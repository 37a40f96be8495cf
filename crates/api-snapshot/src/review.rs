//! Offline helpers for reviewing snapshot files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use api_snapshot_core::{Error, Result, SnapshotPath, SNAPSHOT_EXTENSION};
use api_snapshot_matcher::MatchReport;
use api_snapshot_store::{SnapshotFile, SnapshotStore};

use crate::canonical::canonicalize_body;

/// Find snapshot files under `dir` that still carry the review marker.
///
/// Results are sorted by path.
pub fn find_pending(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pending = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::fs(path, e.into())
        })?;

        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION)
        {
            continue;
        }

        let content = fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
        if !SnapshotFile::parse(&content).is_reviewed() {
            debug!("Pending snapshot: {}", path.display());
            pending.push(path.to_path_buf());
        }
    }

    Ok(pending)
}

/// Compare the snapshot at `snapshot` with the JSON document at `actual`.
pub fn check_file(store: &SnapshotStore, snapshot: &Path, actual: &Path) -> Result<MatchReport> {
    let expected = fs::read_to_string(snapshot).map_err(|e| Error::fs(snapshot, e))?;
    let body = fs::read_to_string(actual).map_err(|e| Error::fs(actual, e))?;
    let actual = canonicalize_body(&body)?;
    store.compare(&SnapshotPath::new(snapshot), &expected, &actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_snapshot_store::MARKER;
    use tempfile::TempDir;

    #[test]
    fn test_find_pending() {
        let dir = TempDir::new().unwrap();
        let suite = dir.path().join("users_snapshots");
        fs::create_dir_all(&suite).unwrap();
        fs::write(suite.join("b.json"), format!("{MARKER}\n{{}}")).unwrap();
        fs::write(suite.join("a.json"), format!("{MARKER}\n[]")).unwrap();
        fs::write(suite.join("reviewed.json"), "{}").unwrap();
        fs::write(suite.join("notes.txt"), format!("{MARKER}\n")).unwrap();

        let pending = find_pending(dir.path()).unwrap();
        assert_eq!(pending, vec![suite.join("a.json"), suite.join("b.json")]);
    }

    #[test]
    fn test_find_pending_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_pending(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_check_file() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("list.json");
        let actual = dir.path().join("actual.json");
        fs::write(&snapshot, format!("{MARKER}\n{{\"id\": \"@integer@\"}}")).unwrap();

        fs::write(&actual, r#"{"id": 5}"#).unwrap();
        let store = SnapshotStore::new();
        assert!(check_file(&store, &snapshot, &actual).unwrap().is_match());

        fs::write(&actual, r#"{"id": "five"}"#).unwrap();
        let report = check_file(&store, &snapshot, &actual).unwrap();
        assert_eq!(report.paths(), vec!["id"]);
    }

    #[test]
    fn test_check_file_invalid_snapshot_names_path() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("broken.json");
        let actual = dir.path().join("actual.json");
        fs::write(&snapshot, "{not json").unwrap();
        fs::write(&actual, "{}").unwrap();

        match check_file(&SnapshotStore::new(), &snapshot, &actual) {
            Err(Error::InvalidSnapshot { path, .. }) => assert_eq!(path, snapshot),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
