//! Snapshot path resolution.
//!
//! Maps a [`SnapshotKey`] to the file its snapshot is stored in. Resolution is
//! pure string and path arithmetic: no filesystem access, no clock, no
//! randomness. Two strategies are available and chosen explicitly through
//! [`LocatorConfig`]:
//!
//! - **namespace**: the suite identifier minus a configured namespace prefix is
//!   mapped onto a tests directory (`tests::api::users` -> `<tests_dir>/api/users`).
//! - **source file**: the harness passes the suite's source file (usually
//!   `file!()`) and its directory and stem are used directly.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Layout, LocatorConfig, Result, SnapshotConfig, SnapshotKey};

/// Resolved location of one snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotPath(PathBuf);

impl SnapshotPath {
    /// Wrap an already resolved path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Borrow as a [`Path`].
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Unwrap into a [`PathBuf`].
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for SnapshotPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SnapshotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone)]
enum Strategy {
    Namespace {
        prefix: Vec<String>,
        tests_dir: PathBuf,
    },
    SourceFile {
        manifest_dir: Option<PathBuf>,
    },
}

/// Derives snapshot paths from snapshot keys.
#[derive(Debug, Clone)]
pub struct PathResolver {
    layout: Layout,
    strategy: Strategy,
}

impl PathResolver {
    /// Build a resolver from configuration.
    ///
    /// Fails with [`Error::Config`] when the namespace strategy is selected
    /// but no tests directory was supplied.
    pub fn new(config: &SnapshotConfig) -> Result<Self> {
        config.validate()?;

        let strategy = match &config.locator {
            LocatorConfig::Namespace {
                tests_namespace,
                tests_dir,
            } => {
                let tests_dir = tests_dir.clone().ok_or_else(|| {
                    Error::Config(
                        "tests root cannot be determined: set locator.tests_dir or use the source_file strategy"
                            .to_string(),
                    )
                })?;
                Strategy::Namespace {
                    prefix: split_identifier(tests_namespace),
                    tests_dir,
                }
            }
            LocatorConfig::SourceFile { manifest_dir } => Strategy::SourceFile {
                manifest_dir: manifest_dir.clone(),
            },
        };

        Ok(Self {
            layout: config.layout,
            strategy,
        })
    }

    /// Layout used by this resolver.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Resolve the snapshot path for `key`.
    ///
    /// `source_file` is the suite's source location. It is required by the
    /// source-file strategy and ignored by the namespace strategy.
    pub fn resolve(&self, key: &SnapshotKey, source_file: Option<&Path>) -> Result<SnapshotPath> {
        key.validate()?;

        let (suite_dir, suite_base) = match &self.strategy {
            Strategy::Namespace { prefix, tests_dir } => {
                Self::namespace_location(prefix, tests_dir, &key.suite)?
            }
            Strategy::SourceFile { manifest_dir } => {
                let source_file = source_file.ok_or_else(|| {
                    Error::Config(format!(
                        "suite '{}' has no source file location and the source_file strategy needs one",
                        key.suite
                    ))
                })?;
                Self::source_file_location(manifest_dir.as_deref(), source_file)?
            }
        };

        Ok(SnapshotPath(
            self.layout.file_path(&suite_dir, &suite_base, &key.case),
        ))
    }

    fn namespace_location(
        prefix: &[String],
        tests_dir: &Path,
        suite: &str,
    ) -> Result<(PathBuf, String)> {
        let components = split_identifier(suite);
        let relative = components.strip_prefix(prefix).ok_or_else(|| {
            Error::Config(format!(
                "suite '{}' is outside the tests namespace '{}'",
                suite,
                prefix.join("::")
            ))
        })?;

        let (base, dirs) = relative.split_last().ok_or_else(|| {
            Error::InvalidKey(format!(
                "suite '{suite}' names the tests namespace itself, not a suite inside it"
            ))
        })?;

        let dir = dirs.iter().fold(tests_dir.to_path_buf(), |dir, c| dir.join(c));
        Ok((dir, base.clone()))
    }

    fn source_file_location(
        manifest_dir: Option<&Path>,
        source_file: &Path,
    ) -> Result<(PathBuf, String)> {
        let source_file = match manifest_dir {
            Some(base) if source_file.is_relative() => base.join(source_file),
            _ => source_file.to_path_buf(),
        };

        let stem = source_file
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                Error::InvalidKey(format!(
                    "source file '{}' has no usable file name",
                    source_file.display()
                ))
            })?;

        let dir = match source_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok((dir, stem.to_string()))
    }
}

/// Split a suite identifier on `::`, `.`, `\` and `/`.
fn split_identifier(identifier: &str) -> Vec<String> {
    identifier
        .replace("::", "/")
        .split(['/', '\\', '.'])
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
