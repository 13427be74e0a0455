//! Query engine module
//!
//! Runs portable queries against one adapter.
//!
//! # Overview
//!
//! The engine module provides:
//! - `QueryEngine` - execute, count and aggregate over a [`SystemAdapter`]
//! - `AggregateFunction` - the client-side folds (count, sum, avg, min, max)

mod aggregate;

pub use aggregate::AggregateFunction;

use crate::adapter::{OperationResult, SystemAdapter};
use crate::query::{Filters, QuerySpec};
use crate::types::JsonValue;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Most records fetched for one aggregation
pub const MAX_AGGREGATE_RECORDS: u32 = 10_000;

/// Query front-end for one connection
pub struct QueryEngine {
    adapter: Arc<dyn SystemAdapter>,
}

impl QueryEngine {
    pub fn new(adapter: Arc<dyn SystemAdapter>) -> Self {
        Self { adapter }
    }

    /// Run `spec` as given
    pub async fn execute(&self, spec: &QuerySpec) -> OperationResult {
        self.adapter.query(spec).await
    }

    /// Re-issue `spec` with no projection and no page window.
    ///
    /// The count is whatever the backend reports as `total_count`; it is advisory.
    pub async fn count(&self, spec: &QuerySpec) -> OperationResult {
        let mut spec = spec.clone();
        spec.fields.clear();
        spec.limit = 0;
        spec.offset = 0;

        let result = self.adapter.query(&spec).await;
        if !result.is_success() {
            return result;
        }

        let total = result
            .meta("total_count")
            .filter(|total| !total.is_null())
            .cloned()
            .unwrap_or_else(|| json!(result.data().as_array().map_or(0, Vec::len)));
        OperationResult::success(json!({ "count": total, "entity": spec.entity }))
            .with_metadata("query", result.meta("query").cloned().unwrap_or_default())
    }

    /// Fetch up to [`MAX_AGGREGATE_RECORDS`] values of `field` and fold them.
    ///
    /// Null and missing values are skipped before folding.
    pub async fn aggregate(
        &self,
        entity: &str,
        field: &str,
        function: &str,
        filters: Filters,
    ) -> OperationResult {
        let function = match function.parse::<AggregateFunction>() {
            Ok(function) => function,
            Err(e) => return OperationResult::from_error(&e),
        };

        let spec = QuerySpec::new(entity)
            .with_filters(filters)
            .fields([field])
            .limit(MAX_AGGREGATE_RECORDS);
        let result = self.adapter.query(&spec).await;
        if !result.is_success() {
            return result;
        }

        let values: Vec<JsonValue> = result
            .data()
            .as_array()
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record.get(field))
                    .filter(|value| !value.is_null())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!("Aggregating {} of {} over {} values", function, field, values.len());

        match function.apply(&values) {
            Ok(value) => OperationResult::success(json!({
                function.as_str(): value,
                "field": field,
                "record_count": values.len(),
            }))
            .with_metadata("entity", entity)
            .with_metadata("query", result.meta("query").cloned().unwrap_or_default()),
            Err(e) => OperationResult::from_error(&e),
        }
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("system", &self.adapter.system())
            .finish()
    }
}
