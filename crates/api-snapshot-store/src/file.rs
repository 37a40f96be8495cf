//! On-disk snapshot format.
//!
//! ```text
//! ⚠️DELETE THIS ROW ⚠️
//! {
//!     "data": [ ... ]
//! }
//! ```
//!
//! Freshly captured snapshots start with the marker line. A reviewer deletes
//! it once the snapshot is accepted as a baseline; the store never removes it.

/// First line of every freshly captured snapshot.
pub const MARKER: &str = "⚠️DELETE THIS ROW ⚠️";

/// A snapshot file split into its review state and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    body: String,
    reviewed: bool,
}

impl SnapshotFile {
    /// A freshly captured snapshot, still carrying the marker.
    pub fn captured(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            reviewed: false,
        }
    }

    /// Split raw file content into marker and body.
    ///
    /// The marker is recognised on the first line only, ignoring trailing
    /// whitespace and a `\r` left by editors.
    pub fn parse(content: &str) -> Self {
        let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
        if first.trim_end() == MARKER.trim_end() {
            Self {
                body: rest.to_string(),
                reviewed: false,
            }
        } else {
            Self {
                body: content.to_string(),
                reviewed: true,
            }
        }
    }

    /// Payload without the marker line.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the marker line has been removed by a reviewer.
    pub fn is_reviewed(&self) -> bool {
        self.reviewed
    }

    /// File content as written to disk.
    pub fn render(&self) -> String {
        if self.reviewed {
            self.body.clone()
        } else {
            format!("{MARKER}\n{}", self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_captured() {
        let file = SnapshotFile::captured("{\n    \"id\": 1\n}");
        assert_eq!(file.render(), "⚠️DELETE THIS ROW ⚠️\n{\n    \"id\": 1\n}");
        assert!(!file.is_reviewed());
    }

    #[test]
    fn test_parse_unreviewed() {
        let file = SnapshotFile::parse("⚠️DELETE THIS ROW ⚠️\n{\"id\": 1}");
        assert!(!file.is_reviewed());
        assert_eq!(file.body(), "{\"id\": 1}");
    }

    #[test]
    fn test_parse_reviewed() {
        let file = SnapshotFile::parse("{\"id\": 1}");
        assert!(file.is_reviewed());
        assert_eq!(file.body(), "{\"id\": 1}");
    }

    #[test]
    fn test_parse_marker_with_crlf() {
        let file = SnapshotFile::parse("⚠️DELETE THIS ROW ⚠️\r\n{}");
        assert!(!file.is_reviewed());
        assert_eq!(file.body(), "{}");
    }

    #[test]
    fn test_parse_roundtrips_render() {
        let captured = SnapshotFile::captured("[1, 2]");
        assert_eq!(SnapshotFile::parse(&captured.render()), captured);
    }

    #[test]
    fn test_marker_only_file() {
        let file = SnapshotFile::parse(MARKER);
        assert!(!file.is_reviewed());
        assert_eq!(file.body(), "");
    }
}
