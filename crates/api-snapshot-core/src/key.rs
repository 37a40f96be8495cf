//! Snapshot identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifies one snapshot: the owning suite plus the test case.
///
/// The same key always resolves to the same path, so a key must be unique per
/// distinct test invocation. Parameterized tests append their data-set name
/// with [`SnapshotKey::with_data_set`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    /// Fully-qualified suite identifier (`my_crate::api::users`, `Tests\Api\UserTest`, ...)
    pub suite: String,
    /// Test case identifier
    pub case: String,
}

impl SnapshotKey {
    /// Create a new key.
    pub fn new(suite: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
        }
    }

    /// Append a data-set discriminator to the case name (`<case>_<data_set>`).
    pub fn with_data_set(mut self, data_set: impl AsRef<str>) -> Self {
        let data_set = data_set.as_ref();
        if !data_set.is_empty() {
            self.case.push('_');
            self.case.push_str(data_set);
        }
        self
    }

    /// Check that the case name can be used as a single file name component.
    ///
    /// Invalid names are rejected rather than rewritten, so two distinct case
    /// names never end up sharing a snapshot file.
    pub fn validate(&self) -> Result<()> {
        if self.suite.trim().is_empty() {
            return Err(Error::InvalidKey("suite identifier is empty".to_string()));
        }
        validate_segment(&self.case)
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.suite, self.case)
    }
}

fn validate_segment(case: &str) -> Result<()> {
    if case.is_empty() {
        return Err(Error::InvalidKey("case name is empty".to_string()));
    }
    if case == "." || case == ".." {
        return Err(Error::InvalidKey(format!("case name '{case}' is reserved")));
    }
    if let Some(bad) = case.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(Error::InvalidKey(format!(
            "case name '{}' contains forbidden character {:?}",
            case.escape_debug(),
            bad
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_data_set() {
        let key = SnapshotKey::new("tests::users", "list_users").with_data_set("admin");
        assert_eq!(key.case, "list_users_admin");
    }

    #[test]
    fn test_empty_data_set_is_ignored() {
        let key = SnapshotKey::new("tests::users", "list_users").with_data_set("");
        assert_eq!(key.case, "list_users");
    }

    #[test]
    fn test_display() {
        let key = SnapshotKey::new("tests::users", "list_users");
        assert_eq!(key.to_string(), "tests::users::list_users");
    }

    #[test]
    fn test_validate_accepts_data_set_names_with_spaces() {
        let key = SnapshotKey::new("tests::users", "list").with_data_set("data set #0");
        assert!(key.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_separators() {
        assert!(SnapshotKey::new("s", "a/b").validate().is_err());
        assert!(SnapshotKey::new("s", "a\\b").validate().is_err());
        assert!(SnapshotKey::new("s", "a\0b").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_and_reserved() {
        assert!(SnapshotKey::new("s", "").validate().is_err());
        assert!(SnapshotKey::new("s", "..").validate().is_err());
        assert!(SnapshotKey::new("", "case").validate().is_err());
    }
}
