//! Client-side aggregation over fetched field values

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Aggregations the engine computes locally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Fold `values` (nulls already removed)
    pub fn apply(self, values: &[JsonValue]) -> Result<JsonValue> {
        match self {
            AggregateFunction::Count => Ok(JsonValue::from(values.len())),
            AggregateFunction::Sum => Ok(JsonValue::from(sum(values)?)),
            AggregateFunction::Avg => {
                if values.is_empty() {
                    return Ok(JsonValue::from(0));
                }
                Ok(JsonValue::from(sum(values)? / values.len() as f64))
            }
            AggregateFunction::Min => extreme(values, Ordering::Less),
            AggregateFunction::Max => extreme(values, Ordering::Greater),
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AggregateFunction::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| Error::Other(format!("Unknown aggregation function: {s}")))
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numbers, numeric strings and booleans as f64
fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn sum(values: &[JsonValue]) -> Result<f64> {
    values.iter().try_fold(0.0, |acc, value| {
        as_number(value)
            .map(|n| acc + n)
            .ok_or_else(|| Error::decode(format!("Cannot aggregate non-numeric value {value}")))
    })
}

/// Smallest (`Less`) or largest (`Greater`) value, returned as it arrived
fn extreme(values: &[JsonValue], keep: Ordering) -> Result<JsonValue> {
    let mut best: Option<&JsonValue> = None;
    for value in values {
        best = match best {
            None => Some(value),
            Some(current) if compare(value, current)? == keep => Some(value),
            keep_current => keep_current,
        };
    }
    Ok(best.cloned().unwrap_or(JsonValue::Null))
}

fn compare(a: &JsonValue, b: &JsonValue) -> Result<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
        }
        (JsonValue::String(x), JsonValue::String(y)) => Ok(x.cmp(y)),
        _ => Err(Error::decode(format!("Cannot compare {a} with {b}"))),
    }
}
