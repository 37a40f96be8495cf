//! Structural JSON matcher with placeholder support.

use std::path::PathBuf;

use serde_json::{Map, Value};

use api_snapshot_core::{Error, Result};

use crate::pattern::{Pattern, TextPattern, UNBOUNDED_ARRAY};
use crate::report::{MatchReport, MismatchKind};
use crate::value::{numbers_equal, type_name};

/// Compares stored snapshot text with actual payload text.
///
/// The snapshot store only talks to this trait, so any engine with a
/// placeholder language can be plugged in.
pub trait MatchEngine: Send + Sync {
    /// Compare `expected` (snapshot body, marker already removed) with `actual`.
    ///
    /// A mismatch is reported in the returned [`MatchReport`]; errors are
    /// reserved for inputs that cannot be compared at all.
    fn compare(&self, expected: &str, actual: &str) -> Result<MatchReport>;
}

/// Default [`MatchEngine`]: structural JSON comparison with `@type@` placeholders.
///
/// - objects compare key by key, ignoring key order
/// - arrays compare element by element, in order
/// - numbers compare numerically (`1` equals `1.0`)
/// - strings in the expected document may hold placeholders
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    /// Stop after the first mismatch
    pub stop_at_first: bool,
}

impl PatternMatcher {
    /// Create a new matcher that reports every mismatch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop at the first mismatch instead of collecting all of them.
    pub fn with_stop_at_first(mut self, enabled: bool) -> Self {
        self.stop_at_first = enabled;
        self
    }

    /// Compare two decoded documents.
    pub fn compare_values(&self, expected: &Value, actual: &Value) -> Result<MatchReport> {
        let mut report = MatchReport::default();
        self.match_value(expected, actual, "", &mut report)?;
        Ok(report)
    }

    fn done(&self, report: &MatchReport) -> bool {
        self.stop_at_first && !report.is_match()
    }

    fn match_value(
        &self,
        expected: &Value,
        actual: &Value,
        path: &str,
        report: &mut MatchReport,
    ) -> Result<()> {
        match (expected, actual) {
            (Value::String(source), _) => self.match_string(source, actual, path, report)?,
            (Value::Object(exp), Value::Object(act)) => {
                self.match_object(exp, act, path, report)?
            }
            (Value::Array(exp), Value::Array(act)) => self.match_array(exp, act, path, report)?,
            (Value::Number(exp), Value::Number(act)) => {
                if !numbers_equal(exp, act) {
                    report.push(path, value_differs(expected, actual));
                }
            }
            (Value::Bool(_), Value::Bool(_)) | (Value::Null, Value::Null) => {
                if expected != actual {
                    report.push(path, value_differs(expected, actual));
                }
            }
            _ => report.push(
                path,
                MismatchKind::TypeDiffers {
                    expected: type_name(expected).to_string(),
                    actual: type_name(actual).to_string(),
                },
            ),
        }
        Ok(())
    }

    fn match_string(
        &self,
        source: &str,
        actual: &Value,
        path: &str,
        report: &mut MatchReport,
    ) -> Result<()> {
        // A payload string stored verbatim matches itself even if it reads as a placeholder
        if matches!(actual, Value::String(text) if text == source) {
            return Ok(());
        }

        if let Some(pattern) = Pattern::parse(source)? {
            if let Err(reason) = pattern.check(actual) {
                report.push(
                    path,
                    MismatchKind::PatternFailed {
                        pattern: pattern.source().to_string(),
                        actual: actual.clone(),
                        reason,
                    },
                );
            }
            return Ok(());
        }

        match actual {
            Value::String(text) if text == source => {}
            Value::String(text) => match TextPattern::parse(source) {
                Some(pattern) if pattern.is_match(text) => {}
                Some(pattern) => report.push(
                    path,
                    MismatchKind::PatternFailed {
                        pattern: pattern.source().to_string(),
                        actual: actual.clone(),
                        reason: "text does not match".to_string(),
                    },
                ),
                None => report.push(
                    path,
                    value_differs(&Value::String(source.to_string()), actual),
                ),
            },
            _ => report.push(
                path,
                MismatchKind::TypeDiffers {
                    expected: "string".to_string(),
                    actual: type_name(actual).to_string(),
                },
            ),
        }
        Ok(())
    }

    fn match_object(
        &self,
        expected: &Map<String, Value>,
        actual: &Map<String, Value>,
        path: &str,
        report: &mut MatchReport,
    ) -> Result<()> {
        for (key, exp) in expected {
            if self.done(report) {
                return Ok(());
            }
            let child = key_path(path, key);
            match actual.get(key) {
                Some(act) => self.match_value(exp, act, &child, report)?,
                None => {
                    let optional = match exp {
                        Value::String(source) => {
                            Pattern::parse(source)?.is_some_and(|p| p.is_optional())
                        }
                        _ => false,
                    };
                    if !optional {
                        report.push(&child, MismatchKind::MissingKey);
                    }
                }
            }
        }

        for (key, act) in actual {
            if self.done(report) {
                return Ok(());
            }
            if !expected.contains_key(key) {
                report.push(
                    &key_path(path, key),
                    MismatchKind::UnexpectedKey {
                        actual: act.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    fn match_array(
        &self,
        expected: &[Value],
        actual: &[Value],
        path: &str,
        report: &mut MatchReport,
    ) -> Result<()> {
        let (expected, unbounded) = match expected.split_last() {
            Some((Value::String(last), head)) if last == UNBOUNDED_ARRAY => (head, true),
            _ => (expected, false),
        };

        let length_ok = if unbounded {
            actual.len() >= expected.len()
        } else {
            actual.len() == expected.len()
        };
        if !length_ok {
            report.push(
                path,
                MismatchKind::LengthDiffers {
                    expected: expected.len(),
                    actual: actual.len(),
                },
            );
        }

        for (index, (exp, act)) in expected.iter().zip(actual).enumerate() {
            if self.done(report) {
                return Ok(());
            }
            self.match_value(exp, act, &format!("{path}[{index}]"), report)?;
        }
        Ok(())
    }
}

impl MatchEngine for PatternMatcher {
    fn compare(&self, expected: &str, actual: &str) -> Result<MatchReport> {
        let expected: Value =
            serde_json::from_str(expected).map_err(|e| Error::InvalidSnapshot {
                path: PathBuf::new(),
                reason: e.to_string(),
            })?;
        let actual: Value = serde_json::from_str(actual)?;
        self.compare_values(&expected, &actual)
    }
}

fn value_differs(expected: &Value, actual: &Value) -> MismatchKind {
    MismatchKind::ValueDiffers {
        expected: expected.clone(),
        actual: actual.clone(),
    }
}

/// Append an object key to a path: `data` + `id` -> `data.id`, quoted when needed.
fn key_path(parent: &str, key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    match (parent.is_empty(), plain) {
        (true, true) => key.to_string(),
        (false, true) => format!("{parent}.{key}"),
        (_, false) => format!("{parent}[{}]", Value::String(key.to_string())),
    }
}
