//! Snapshot file layouts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Where snapshot files are placed relative to the suite they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// `<dir>/<suite>_snapshots/<case>.json`
    #[default]
    Directory,
    /// `<dir>/<suite>_<case>.json`
    Flat,
}

impl Layout {
    /// Build the snapshot file path for a suite directory, suite base name and case.
    pub fn file_path(self, suite_dir: &Path, suite_base: &str, case: &str) -> PathBuf {
        match self {
            Layout::Directory => suite_dir
                .join(format!("{suite_base}_snapshots"))
                .join(format!("{case}.{SNAPSHOT_EXTENSION}")),
            Layout::Flat => {
                suite_dir.join(format!("{suite_base}_{case}.{SNAPSHOT_EXTENSION}"))
            }
        }
    }
}
