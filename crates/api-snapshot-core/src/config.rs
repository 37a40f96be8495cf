//! Configuration types for api-snapshot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Layout};

/// Snapshot configuration, supplied by the test suite or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Where snapshot files live relative to their suite
    pub layout: Layout,
    /// How the suite's directory is found
    pub locator: LocatorConfig,
    /// Fail instead of comparing when a snapshot still carries the review marker
    pub reject_unreviewed: bool,
}

impl SnapshotConfig {
    /// Namespace-stripping configuration rooted at `tests_dir`.
    pub fn namespace(tests_namespace: impl Into<String>, tests_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator: LocatorConfig::Namespace {
                tests_namespace: tests_namespace.into(),
                tests_dir: Some(tests_dir.into()),
            },
            ..Self::default()
        }
    }

    /// Source-file configuration; relative suite files are joined onto `manifest_dir`.
    pub fn source_file(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator: LocatorConfig::SourceFile {
                manifest_dir: Some(manifest_dir.into()),
            },
            ..Self::default()
        }
    }

    /// Use the given layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable or disable rejection of snapshots that were never reviewed.
    pub fn with_reject_unreviewed(mut self, enabled: bool) -> Self {
        self.reject_unreviewed = enabled;
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: SnapshotConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// A missing tests directory is not reported here: it only becomes an
    /// error once a resolver is built from the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        match &self.locator {
            LocatorConfig::Namespace {
                tests_namespace,
                tests_dir,
            } => {
                if tests_namespace.contains(char::is_whitespace) {
                    return Err(Error::Config(format!(
                        "locator.tests_namespace '{tests_namespace}' must not contain whitespace"
                    )));
                }
                if matches!(tests_dir, Some(dir) if dir.as_os_str().is_empty()) {
                    return Err(Error::Config(
                        "locator.tests_dir must not be empty".to_string(),
                    ));
                }
            }
            LocatorConfig::SourceFile { manifest_dir } => {
                if matches!(manifest_dir, Some(dir) if dir.as_os_str().is_empty()) {
                    return Err(Error::Config(
                        "locator.manifest_dir must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Strategy used to find the directory a suite lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LocatorConfig {
    /// Strip `tests_namespace` from the suite identifier and map the rest under `tests_dir`.
    Namespace {
        /// Namespace prefix of the test tree (`tests::`, `Tests\`, ...)
        #[serde(default = "default_tests_namespace")]
        tests_namespace: String,
        /// Directory the namespace maps to
        #[serde(default)]
        tests_dir: Option<PathBuf>,
    },
    /// Use the suite's source file, supplied per suite by the test harness.
    SourceFile {
        /// Base for relative source file paths
        #[serde(default)]
        manifest_dir: Option<PathBuf>,
    },
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig::Namespace {
            tests_namespace: default_tests_namespace(),
            tests_dir: None,
        }
    }
}

fn default_tests_namespace() -> String {
    "tests::".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapshotConfig::default();
        assert_eq!(config.layout, Layout::Directory);
        assert!(!config.reject_unreviewed);
        assert_eq!(
            config.locator,
            LocatorConfig::Namespace {
                tests_namespace: "tests::".to_string(),
                tests_dir: None,
            }
        );
    }

    #[test]
    fn test_config_validation() {
        let config = SnapshotConfig::namespace("tests::", "/app/tests");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_tests_dir_rejected() {
        let config = SnapshotConfig::namespace("tests::", "");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_yaml_namespace() {
        let yaml = r#"
layout: flat
reject_unreviewed: true
locator:
  strategy: namespace
  tests_namespace: "Tests\\"
  tests_dir: /app/tests
"#;

        let config = SnapshotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.layout, Layout::Flat);
        assert!(config.reject_unreviewed);
        assert_eq!(
            config.locator,
            LocatorConfig::Namespace {
                tests_namespace: "Tests\\".to_string(),
                tests_dir: Some(PathBuf::from("/app/tests")),
            }
        );
    }

    #[test]
    fn test_parse_yaml_source_file() {
        let yaml = r#"
locator:
  strategy: source_file
  manifest_dir: /work/my-api
"#;

        let config = SnapshotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.layout, Layout::Directory);
        assert_eq!(
            config.locator,
            LocatorConfig::SourceFile {
                manifest_dir: Some(PathBuf::from("/work/my-api")),
            }
        );
    }

    #[test]
    fn test_parse_yaml_defaults_namespace() {
        let yaml = r#"
locator:
  strategy: namespace
  tests_dir: /app/tests
"#;

        let config = SnapshotConfig::from_yaml(yaml).unwrap();
        match config.locator {
            LocatorConfig::Namespace {
                tests_namespace, ..
            } => assert_eq!(tests_namespace, "tests::"),
            other => panic!("unexpected locator: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_layout() {
        let yaml = "layout: nested\n";
        assert!(matches!(
            SnapshotConfig::from_yaml(yaml),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = SnapshotConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
