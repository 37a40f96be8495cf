//! Placeholder patterns embedded in stored snapshots.
//!
//! A JSON string in a stored snapshot is read in one of three ways:
//!
//! 1. A **whole pattern** such as `"@string@"`, `"@integer@.greaterThan(0)"`
//!    or `"@string@||@null@"`: the actual value must satisfy the placeholder.
//! 2. A **text pattern** such as `"5d675197-22ec-@integer@-8647"`: literal
//!    text with placeholder tokens, matched against an actual string.
//! 3. Anything else is a literal.
//!
//! Only known type names start a pattern, so ordinary strings that happen to
//! contain `@` stay literal.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use api_snapshot_core::{Error, Result};

use crate::expander::{is_date, is_datetime, is_time, Expander};
use crate::value::type_name;

/// Array element that accepts any remaining elements of the actual array.
pub const UNBOUNDED_ARRAY: &str = "@...@";

lazy_static! {
    static ref EXPANDER_START: Regex = Regex::new(r"^\.([A-Za-z]+)\(").unwrap();
    static ref TEXT_TOKEN: Regex = Regex::new(r"@([a-z]+|\*)@").unwrap();
}

/// Placeholder type: the first token of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// `@string@`
    String,
    /// `@integer@`
    Integer,
    /// `@double@`
    Double,
    /// `@number@`: any number or numeric string
    Number,
    /// `@boolean@`
    Boolean,
    /// `@null@`
    Null,
    /// `@array@`: JSON array or object
    Array,
    /// `@json@`: string holding valid JSON
    Json,
    /// `@uuid@`
    Uuid,
    /// `@datetime@`
    DateTime,
    /// `@date@`
    Date,
    /// `@time@`
    Time,
    /// `@*@` or `@wildcard@`
    Wildcard,
}

impl ValueType {
    /// Look up a placeholder type by the name between the `@` signs.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => ValueType::String,
            "integer" => ValueType::Integer,
            "double" => ValueType::Double,
            "number" => ValueType::Number,
            "boolean" => ValueType::Boolean,
            "null" => ValueType::Null,
            "array" => ValueType::Array,
            "json" => ValueType::Json,
            "uuid" => ValueType::Uuid,
            "datetime" => ValueType::DateTime,
            "date" => ValueType::Date,
            "time" => ValueType::Time,
            "*" | "wildcard" => ValueType::Wildcard,
            _ => return None,
        })
    }

    /// Name as written in a pattern.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
            ValueType::Array => "array",
            ValueType::Json => "json",
            ValueType::Uuid => "uuid",
            ValueType::DateTime => "datetime",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Wildcard => "wildcard",
        }
    }

    /// Whether `value` is of this type.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Wildcard, _) => true,
            (ValueType::String, Value::String(_)) => true,
            (ValueType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (ValueType::Double, Value::Number(n)) => n.is_f64(),
            (ValueType::Number, Value::Number(_)) => true,
            (ValueType::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            (ValueType::Boolean, Value::Bool(_)) => true,
            (ValueType::Null, Value::Null) => true,
            (ValueType::Array, Value::Array(_) | Value::Object(_)) => true,
            (ValueType::Json, Value::String(s)) => serde_json::from_str::<Value>(s).is_ok(),
            (ValueType::Uuid, Value::String(s)) => uuid::Uuid::parse_str(s).is_ok(),
            (ValueType::DateTime, Value::String(s)) => is_datetime(s),
            (ValueType::Date, Value::String(s)) => is_date(s),
            (ValueType::Time, Value::String(s)) => is_time(s),
            _ => false,
        }
    }

    /// Regex fragment used when the token appears inside literal text.
    fn text_fragment(self) -> Option<&'static str> {
        Some(match self {
            ValueType::String => ".+",
            ValueType::Integer => r"-?\d+",
            ValueType::Double => r"-?\d+\.\d+",
            ValueType::Number => r"-?\d+(?:\.\d+)?",
            ValueType::Boolean => "(?:true|false)",
            ValueType::Null => "null",
            ValueType::Uuid => {
                "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
            }
            ValueType::DateTime => {
                r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?"
            }
            ValueType::Date => r"\d{4}-\d{2}-\d{2}",
            ValueType::Time => r"\d{2}:\d{2}(?::\d{2})?",
            ValueType::Wildcard => ".*",
            ValueType::Array | ValueType::Json => return None,
        })
    }
}

/// One alternative of a pattern: a type plus its expander chain.
#[derive(Debug, Clone)]
pub struct TypePattern {
    /// Placeholder type
    pub value_type: ValueType,
    /// Constraints applied after the type check, in order
    pub expanders: Vec<Expander>,
}

impl TypePattern {
    fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            expanders: Vec::new(),
        }
    }

    fn check(&self, actual: &Value) -> std::result::Result<(), String> {
        if !self.value_type.matches(actual) {
            return Err(format!(
                "expected @{}@, got {} {}",
                self.value_type.name(),
                type_name(actual),
                actual
            ));
        }
        self.expanders.iter().try_for_each(|e| e.check(actual))
    }
}

/// A whole-string placeholder pattern, possibly with `||` alternatives.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    alternatives: Vec<TypePattern>,
}

impl Pattern {
    /// Parse `source` as a whole pattern.
    ///
    /// Returns `Ok(None)` when the string is not a pattern at all, and an
    /// [`Error::InvalidPattern`] when it starts like one but the expander chain
    /// is malformed.
    pub fn parse(source: &str) -> Result<Option<Self>> {
        let Some((first, mut rest)) = type_token(source) else {
            return Ok(None);
        };
        if !rest.is_empty() && !rest.starts_with("||") && !EXPANDER_START.is_match(rest) {
            return Ok(None);
        }

        let invalid = |reason: String| Error::InvalidPattern(format!("'{source}': {reason}"));

        let mut alternatives = Vec::new();
        let mut current = TypePattern::new(first);
        loop {
            if rest.is_empty() {
                alternatives.push(current);
                break;
            }
            if let Some(after) = rest.strip_prefix("||") {
                alternatives.push(current);
                let (value_type, remaining) = type_token(after)
                    .ok_or_else(|| invalid("expected a placeholder type after '||'".to_string()))?;
                current = TypePattern::new(value_type);
                rest = remaining;
                continue;
            }
            if let Some(caps) = EXPANDER_START.captures(rest) {
                let name = caps[1].to_string();
                let (args, remaining) = parse_args(&rest[caps[0].len()..]).map_err(&invalid)?;
                current
                    .expanders
                    .push(Expander::build(&name, args).map_err(&invalid)?);
                rest = remaining;
                continue;
            }
            return Err(invalid(format!("unexpected '{rest}'")));
        }

        Ok(Some(Self {
            source: source.to_string(),
            alternatives,
        }))
    }

    /// The pattern as written in the snapshot.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether an object key holding this pattern may be absent.
    pub fn is_optional(&self) -> bool {
        self.alternatives
            .iter()
            .any(|alt| alt.expanders.iter().any(Expander::is_optional))
    }

    /// Check `actual`; on failure the error explains why each alternative failed.
    pub fn check(&self, actual: &Value) -> std::result::Result<(), String> {
        let mut reasons = Vec::with_capacity(self.alternatives.len());
        for alternative in &self.alternatives {
            match alternative.check(actual) {
                Ok(()) => return Ok(()),
                Err(reason) => reasons.push(reason),
            }
        }
        Err(reasons.join("; or "))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Literal text with embedded placeholder tokens.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Build a text pattern, or `None` when `source` holds no known token.
    pub fn parse(source: &str) -> Option<Self> {
        let mut regex = String::from("(?s)^");
        let mut last = 0;
        let mut found = false;

        for caps in TEXT_TOKEN.captures_iter(source) {
            let token = caps.get(0)?;
            let Some(fragment) = ValueType::from_name(&caps[1]).and_then(ValueType::text_fragment)
            else {
                continue;
            };
            regex.push_str(&regex::escape(&source[last..token.start()]));
            regex.push_str("(?:");
            regex.push_str(fragment);
            regex.push(')');
            last = token.end();
            found = true;
        }

        if !found {
            return None;
        }
        regex.push_str(&regex::escape(&source[last..]));
        regex.push('$');

        Regex::new(&regex).ok().map(|regex| Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the snapshot.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Split `@name@` off the front of `s` when `name` is a known type.
fn type_token(s: &str) -> Option<(ValueType, &str)> {
    let after = s.strip_prefix('@')?;
    let end = after.find('@')?;
    let value_type = ValueType::from_name(&after[..end])?;
    Some((value_type, &after[end + 1..]))
}

/// Parse a comma-separated argument list up to and including `)`.
fn parse_args(s: &str) -> std::result::Result<(Vec<Value>, &str), String> {
    let mut args = Vec::new();
    let mut rest = s.trim_start();
    if let Some(after) = rest.strip_prefix(')') {
        return Ok((args, after));
    }
    loop {
        let (value, after) = parse_literal(rest)?;
        args.push(value);
        let after = after.trim_start();
        if let Some(next) = after.strip_prefix(',') {
            rest = next.trim_start();
        } else if let Some(end) = after.strip_prefix(')') {
            return Ok((args, end));
        } else {
            return Err(format!("expected ',' or ')' near '{after}'"));
        }
    }
}

/// Parse one argument literal: quoted string, number, boolean or null.
fn parse_literal(s: &str) -> std::result::Result<(Value, &str), String> {
    let Some(quote) = s.chars().next() else {
        return Err("unterminated argument list".to_string());
    };

    if quote == '"' || quote == '\'' {
        let mut out = String::new();
        let mut chars = s.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, next)) if next == quote || next == '\\' => out.push(next),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                c if c == quote => return Ok((Value::String(out), &s[i + 1..])),
                c => out.push(c),
            }
        }
        return Err(format!("unterminated string in '{s}'"));
    }

    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')))
        .unwrap_or(s.len());
    let (word, rest) = s.split_at(end);
    match word {
        "true" => Ok((Value::Bool(true), rest)),
        "false" => Ok((Value::Bool(false), rest)),
        "null" => Ok((Value::Null, rest)),
        _ => serde_json::from_str::<serde_json::Number>(word)
            .map(|n| (Value::Number(n), rest))
            .map_err(|_| format!("invalid argument '{word}'")),
    }
}
