//! Portable query specification

use super::filter::{conditions, Condition, Filters};
use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Page size used when a caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 100;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Vendor-agnostic query: entity, filters, projection, ordering and one page window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Entity / object / record type to query
    pub entity: String,
    /// Portable filter map
    #[serde(default)]
    pub filters: Filters,
    /// Projected fields; empty means all
    #[serde(default)]
    pub fields: Vec<String>,
    /// Sort fields; `-Field` sorts descending
    #[serde(default)]
    pub order_by: Vec<String>,
    /// Page size; 0 omits the limit clause
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Rows to skip; 0 omits the offset clause
    #[serde(default)]
    pub offset: u32,
}

impl QuerySpec {
    /// Query every field of `entity`, first page
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filters: Filters::new(),
            fields: Vec::new(),
            order_by: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Parse from a JSON object, applying the same defaults
    pub fn from_value(value: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Add one filter entry
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Replace the filter map
    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the projected fields
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the sort order
    #[must_use]
    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    /// Set the page size
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the number of rows to skip
    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Parsed filter entries, in map order
    pub fn conditions(&self) -> impl Iterator<Item = Condition<'_>> {
        conditions(&self.filters)
    }
}
