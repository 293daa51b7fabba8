// src/schema/mod.rs
//! Schema normalizer: turns loosely-keyed remote records into strict records.
//!
//! - Each target field has a declarative alias list; the first alias present wins.
//! - Numbers coerce like a spreadsheet export would be read: numeric strings
//!   parse, everything unparsable becomes 0, negatives and non-finite clamp to 0.
//! - Strings must be non-blank to count as present, otherwise the next alias
//!   (and finally the default) is used.
//! - Canonical output keys are part of every alias list, so normalizing an
//!   already-normalized record gives the same record back.

pub mod inventory;
pub mod progress;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::FeedError;

pub use inventory::InventoryRecord;
pub use progress::ProgressRecord;

/// Untyped record exactly as received from a feed.
pub type RawRecord = Map<String, Value>;

/// Top-level keys under which a feed may wrap its record list.
pub const RECORD_CONTAINER_KEYS: &[&str] = &["data", "records", "rows"];

/// Accepted source keys for one target field, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    /// First alias whose value is present and not `null`. Numeric zero counts.
    pub fn lookup<'a>(&self, raw: &'a RawRecord) -> Option<&'a Value> {
        self.aliases
            .iter()
            .find_map(|k| raw.get(*k).filter(|v| !v.is_null()))
    }

    pub fn number(&self, raw: &RawRecord) -> f64 {
        self.lookup(raw).map(coerce_number).unwrap_or(0.0)
    }

    /// First alias carrying a non-blank scalar, trimmed; `default` otherwise.
    pub fn text(&self, raw: &RawRecord, default: &str) -> String {
        self.aliases
            .iter()
            .filter_map(|k| raw.get(*k))
            .filter_map(scalar_text)
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// A strict record shape one feed normalizes into.
pub trait NormalizedRecord: Clone + Serialize + Send + Sync + 'static {
    /// Human-readable kind for logs.
    const KIND: &'static str;

    /// Alias table driving `from_raw`.
    fn fields() -> &'static [FieldAliases];

    /// Never fails; missing or unparsable fields take their defaults.
    fn from_raw(raw: &RawRecord) -> Self;
}

/// Coerce any JSON scalar into a non-negative finite number.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric_str(s),
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Decimal, exponent and unsigned `0x`/`0o`/`0b` literals; anything else is NaN.
fn parse_numeric_str(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    let radix = match t.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return t.parse::<f64>().unwrap_or(f64::NAN),
    };
    let digits = &t[2..];
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accept either a bare array or an object wrapping the array under one of
/// [`RECORD_CONTAINER_KEYS`].
pub fn unwrap_records(body: Value) -> Result<Vec<Value>, FeedError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            for key in RECORD_CONTAINER_KEYS {
                match obj.remove(*key) {
                    Some(Value::Array(items)) => return Ok(items),
                    Some(_) => {
                        return Err(FeedError::malformed(format!(
                            "Data format invalid: `{key}` is not an array"
                        )))
                    }
                    None => continue,
                }
            }
            Err(FeedError::malformed(
                "Data format invalid: object without a record list",
            ))
        }
        other => Err(FeedError::malformed(format!(
            "Data format invalid: expected array, got {}",
            json_kind(&other)
        ))),
    }
}

/// Unwrap the container and normalize every element. Any non-object element
/// fails the whole batch.
pub fn normalize_records<R: NormalizedRecord>(body: Value) -> Result<Vec<R>, FeedError> {
    let items = unwrap_records(body)?;
    let mut records = Vec::with_capacity(items.len());
    let mut defaulted = vec![0usize; R::fields().len()];

    for (i, item) in items.iter().enumerate() {
        let Value::Object(raw) = item else {
            return Err(FeedError::malformed(format!(
                "Data format invalid: record {i} is {}, not an object",
                json_kind(item)
            )));
        };
        for (count, f) in defaulted.iter_mut().zip(R::fields()) {
            if f.lookup(raw).is_none() {
                *count += 1;
            }
        }
        records.push(R::from_raw(raw));
    }

    for (count, f) in defaulted.iter().zip(R::fields()) {
        if *count > 0 {
            tracing::debug!(
                target: "schema",
                kind = R::KIND,
                field = f.field,
                records = *count,
                "no alias present, default used"
            );
        }
    }
    Ok(records)
}

/// Canonical fields of `R` for which `raw` carries none of the aliases.
pub fn absent_fields<R: NormalizedRecord>(raw: &RawRecord) -> Vec<&'static str> {
    R::fields()
        .iter()
        .filter(|f| f.lookup(raw).is_none())
        .map(|f| f.field)
        .collect()
}

/// Parse a response body and normalize it.
pub fn normalize_body<R: NormalizedRecord>(body: &str) -> Result<Vec<R>, FeedError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FeedError::malformed(format!("invalid JSON body: {e}")))?;
    normalize_records(value)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
