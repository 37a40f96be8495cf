//! Expanders: extra constraints chained after a placeholder type.
//!
//! `@string@.isDateTime()` first checks that the value is a string, then runs
//! the `isDateTime` expander on it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::value::{as_number, type_name};

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap();
    static ref URL: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+[^\s]*$").unwrap();
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"];

/// Whether `s` reads as a date-time (RFC 3339, RFC 2822, common SQL forms or a bare date).
pub fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
        || OFFSET_DATETIME_FORMATS
            .iter()
            .any(|f| DateTime::parse_from_str(s, f).is_ok())
        || NAIVE_DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || is_date(s)
}

/// Whether `s` is a calendar date (`YYYY-MM-DD`).
pub fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Whether `s` is a time of day (`HH:MM[:SS[.f]]`).
pub fn is_time(s: &str) -> bool {
    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .any(|f| NaiveTime::parse_from_str(s, f).is_ok())
}

/// One constraint in a placeholder's expander chain.
#[derive(Debug, Clone)]
pub enum Expander {
    /// String parses as a date-time
    IsDateTime,
    /// String parses as a date
    IsDate,
    /// String looks like an e-mail address
    IsEmail,
    /// String looks like an absolute URL
    IsUrl,
    /// Empty string, array, object or null
    IsEmpty,
    /// Anything but [`Expander::IsEmpty`]
    IsNotEmpty,
    /// String prefix
    StartsWith {
        /// Expected prefix
        needle: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// String suffix
    EndsWith {
        /// Expected suffix
        needle: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// String contains a substring
    Contains {
        /// Expected substring
        needle: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// String does not contain a substring
    NotContains {
        /// Forbidden substring
        needle: String,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// String matches a regular expression
    MatchRegex(Regex),
    /// Number strictly below a bound
    LowerThan(f64),
    /// Number strictly above a bound
    GreaterThan(f64),
    /// Array contains the given value
    InArray(Value),
    /// Array or object has exactly this many entries
    Count(usize),
    /// Object key may be absent
    Optional,
}

impl Expander {
    /// Build an expander from its name and parsed arguments.
    pub fn build(name: &str, args: Vec<Value>) -> Result<Self, String> {
        let no_args = |expander: Expander| {
            if args.is_empty() {
                Ok(expander)
            } else {
                Err(format!("{name}() takes no arguments"))
            }
        };

        match name {
            "isDateTime" => no_args(Expander::IsDateTime),
            "isDate" => no_args(Expander::IsDate),
            "isEmail" => no_args(Expander::IsEmail),
            "isUrl" => no_args(Expander::IsUrl),
            "isEmpty" => no_args(Expander::IsEmpty),
            "isNotEmpty" => no_args(Expander::IsNotEmpty),
            "optional" => no_args(Expander::Optional),
            "startsWith" | "endsWith" | "contains" | "notContains" => {
                let (needle, ignore_case) = string_with_flag(name, &args)?;
                Ok(match name {
                    "startsWith" => Expander::StartsWith {
                        needle,
                        ignore_case,
                    },
                    "endsWith" => Expander::EndsWith {
                        needle,
                        ignore_case,
                    },
                    "contains" => Expander::Contains {
                        needle,
                        ignore_case,
                    },
                    _ => Expander::NotContains {
                        needle,
                        ignore_case,
                    },
                })
            }
            "matchRegex" => match args.as_slice() {
                [Value::String(source)] => compile_regex(source).map(Expander::MatchRegex),
                _ => Err("matchRegex() takes one string argument".to_string()),
            },
            "lowerThan" | "greaterThan" => {
                let bound = match args.as_slice() {
                    [value] => as_number(value),
                    _ => None,
                }
                .ok_or_else(|| format!("{name}() takes one numeric argument"))?;
                Ok(if name == "lowerThan" {
                    Expander::LowerThan(bound)
                } else {
                    Expander::GreaterThan(bound)
                })
            }
            "inArray" => match <[Value; 1]>::try_from(args) {
                Ok([value]) => Ok(Expander::InArray(value)),
                Err(_) => Err("inArray() takes one argument".to_string()),
            },
            "count" => match args.as_slice() {
                [Value::Number(n)] => n
                    .as_u64()
                    .map(|n| Expander::Count(n as usize))
                    .ok_or_else(|| "count() takes a non-negative integer".to_string()),
                _ => Err("count() takes one integer argument".to_string()),
            },
            other => Err(format!("unknown expander '{other}'")),
        }
    }

    /// Whether this expander only marks the key as optional.
    pub fn is_optional(&self) -> bool {
        matches!(self, Expander::Optional)
    }

    /// Check `actual` against this expander. The error is a short reason.
    pub fn check(&self, actual: &Value) -> Result<(), String> {
        match self {
            Expander::IsDateTime => {
                check_str(actual, "a date-time", is_datetime)
            }
            Expander::IsDate => check_str(actual, "a date", is_date),
            Expander::IsEmail => check_str(actual, "an e-mail address", |s| EMAIL.is_match(s)),
            Expander::IsUrl => check_str(actual, "a URL", |s| URL.is_match(s)),
            Expander::IsEmpty => {
                if is_empty(actual) {
                    Ok(())
                } else {
                    Err(format!("expected an empty value, got {actual}"))
                }
            }
            Expander::IsNotEmpty => {
                if is_empty(actual) {
                    Err(format!("expected a non-empty value, got {actual}"))
                } else {
                    Ok(())
                }
            }
            Expander::StartsWith {
                needle,
                ignore_case,
            } => check_needle(actual, needle, *ignore_case, "start with", |h, n| {
                h.starts_with(n)
            }),
            Expander::EndsWith {
                needle,
                ignore_case,
            } => check_needle(actual, needle, *ignore_case, "end with", |h, n| {
                h.ends_with(n)
            }),
            Expander::Contains {
                needle,
                ignore_case,
            } => check_needle(actual, needle, *ignore_case, "contain", |h, n| h.contains(n)),
            Expander::NotContains {
                needle,
                ignore_case,
            } => check_needle(actual, needle, *ignore_case, "not contain", |h, n| {
                !h.contains(n)
            }),
            Expander::MatchRegex(regex) => check_str(
                actual,
                &format!("a match for /{}/", regex.as_str()),
                |s| regex.is_match(s),
            ),
            Expander::LowerThan(bound) => match as_number(actual) {
                Some(n) if n < *bound => Ok(()),
                _ => Err(format!("expected a number lower than {bound}, got {actual}")),
            },
            Expander::GreaterThan(bound) => match as_number(actual) {
                Some(n) if n > *bound => Ok(()),
                _ => Err(format!("expected a number greater than {bound}, got {actual}")),
            },
            Expander::InArray(value) => match actual {
                Value::Array(items) if items.contains(value) => Ok(()),
                _ => Err(format!("expected an array containing {value}, got {actual}")),
            },
            Expander::Count(count) => {
                let len = match actual {
                    Value::Array(items) => Some(items.len()),
                    Value::Object(map) => Some(map.len()),
                    _ => None,
                };
                match len {
                    Some(len) if len == *count => Ok(()),
                    Some(len) => Err(format!("expected {count} entries, got {len}")),
                    None => Err(format!(
                        "expected {count} entries, got a {}",
                        type_name(actual)
                    )),
                }
            }
            Expander::Optional => Ok(()),
        }
    }
}

fn string_with_flag(name: &str, args: &[Value]) -> Result<(String, bool), String> {
    match args {
        [Value::String(needle)] => Ok((needle.clone(), false)),
        [Value::String(needle), Value::Bool(ignore_case)] => Ok((needle.clone(), *ignore_case)),
        _ => Err(format!(
            "{name}() takes a string and an optional ignore-case flag"
        )),
    }
}

/// Compile a regex, accepting `/.../flags` delimited sources.
fn compile_regex(source: &str) -> Result<Regex, String> {
    let pattern = match source.strip_prefix('/').and_then(|s| s.rsplit_once('/')) {
        Some((body, flags)) if flags.chars().all(|c| c.is_ascii_alphabetic()) => {
            let inline: String = flags.chars().filter(|c| "imsxU".contains(*c)).collect();
            if inline.is_empty() {
                body.to_string()
            } else {
                format!("(?{inline}){body}")
            }
        }
        _ => source.to_string(),
    };
    Regex::new(&pattern).map_err(|e| format!("invalid regex '{source}': {e}"))
}

fn check_str(actual: &Value, what: &str, pred: impl Fn(&str) -> bool) -> Result<(), String> {
    match actual {
        Value::String(s) if pred(s) => Ok(()),
        _ => Err(format!("expected {what}, got {actual}")),
    }
}

fn check_needle(
    actual: &Value,
    needle: &str,
    ignore_case: bool,
    verb: &str,
    pred: impl Fn(&str, &str) -> bool,
) -> Result<(), String> {
    let Value::String(haystack) = actual else {
        return Err(format!("expected a string to {verb} '{needle}', got {actual}"));
    };
    let ok = if ignore_case {
        pred(&haystack.to_lowercase(), &needle.to_lowercase())
    } else {
        pred(haystack, needle)
    };
    if ok {
        Ok(())
    } else {
        Err(format!("expected a string to {verb} '{needle}', got {actual}"))
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
