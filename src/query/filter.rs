//! Portable filter encoding
//!
//! A filter map is `{ "<field>[__<op>]": value }`. The suffix picks the
//! operator; no suffix (or an unrecognized one) means equality.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter map. Insertion order is kept, so rendering is deterministic.
pub type Filters = JsonObject;

/// Comparison operator encoded by a filter-key suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    Null,
}

/// Recognized suffixes, checked in this order
const SUFFIXES: [(&str, FilterOp); 8] = [
    ("__gt", FilterOp::Gt),
    ("__gte", FilterOp::Gte),
    ("__lt", FilterOp::Lt),
    ("__lte", FilterOp::Lte),
    ("__ne", FilterOp::Ne),
    ("__in", FilterOp::In),
    ("__like", FilterOp::Like),
    ("__null", FilterOp::Null),
];

impl FilterOp {
    /// Operator name as used in filter keys
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::In => "in",
            FilterOp::Like => "like",
            FilterOp::Null => "null",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a filter key into `(field, operator)`.
///
/// ```
/// use enterprise_bridge::query::{parse_filter_key, FilterOp};
///
/// assert_eq!(parse_filter_key("Amount__gte"), ("Amount", FilterOp::Gte));
/// assert_eq!(parse_filter_key("Name"), ("Name", FilterOp::Eq));
/// assert_eq!(parse_filter_key("Name__regex"), ("Name__regex", FilterOp::Eq));
/// ```
pub fn parse_filter_key(key: &str) -> (&str, FilterOp) {
    SUFFIXES
        .iter()
        .find_map(|(suffix, op)| key.strip_suffix(suffix).map(|field| (field, *op)))
        .unwrap_or((key, FilterOp::Eq))
}

/// One parsed filter entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition<'a> {
    /// Original key, kept for error messages
    pub key: &'a str,
    /// Field name with the suffix stripped
    pub field: &'a str,
    /// Operator
    pub op: FilterOp,
    /// Literal value
    pub value: &'a JsonValue,
}

impl<'a> Condition<'a> {
    /// Parse one filter entry
    pub fn parse(key: &'a str, value: &'a JsonValue) -> Self {
        let (field, op) = parse_filter_key(key);
        Self {
            key,
            field,
            op,
            value,
        }
    }

    /// Values of an `__in` filter. Anything but a JSON array is rejected.
    pub fn in_values(&self) -> Result<&'a [JsonValue]> {
        match self.value {
            JsonValue::Array(items) => Ok(items.as_slice()),
            other => Err(Error::translation(
                self.key,
                format!("__in requires a list value, got {}", json_kind(other)),
            )),
        }
    }

    /// Whether a `__null` filter asks for IS NULL (truthy) or IS NOT NULL (falsy)
    pub fn wants_null(&self) -> bool {
        is_truthy(self.value)
    }
}

/// Parse every entry of a filter map, in map order
pub fn conditions(filters: &Filters) -> impl Iterator<Item = Condition<'_>> {
    filters.iter().map(|(k, v)| Condition::parse(k, v))
}

/// Truthiness in the loose scripting sense: false, 0, "", [], {} and null are falsy
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}

// ============================================================================
// Literal rendering
// ============================================================================

/// How a dialect escapes a quote inside a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteStyle {
    /// `O''Brien` (OData, ANSI SQL)
    Doubled,
    /// `O\'Brien` (SOQL)
    Backslash,
}

/// Quote a string literal
pub(crate) fn quote(text: &str, style: QuoteStyle) -> String {
    let escaped = match style {
        QuoteStyle::Doubled => text.replace('\'', "''"),
        QuoteStyle::Backslash => text.replace('\\', "\\\\").replace('\'', "\\'"),
    };
    format!("'{escaped}'")
}

/// Render a literal: strings quoted, numbers and booleans bare
pub(crate) fn literal(value: &JsonValue, style: QuoteStyle) -> String {
    match value {
        JsonValue::String(s) => quote(s, style),
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => quote(&other.to_string(), style),
    }
}

/// Plain text of a value, without JSON quoting
pub(crate) fn text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One `order_by` entry; a leading `-` means descending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderTerm<'a> {
    pub field: &'a str,
    pub descending: bool,
}

pub(crate) fn order_terms(order_by: &[String]) -> impl Iterator<Item = OrderTerm<'_>> {
    order_by
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.strip_prefix('-') {
            Some(field) => OrderTerm {
                field,
                descending: true,
            },
            None => OrderTerm {
                field: entry,
                descending: false,
            },
        })
}
