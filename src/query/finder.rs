//! REST finder rendering (Oracle Fusion `?q=` queries)

use super::filter::{order_terms, QuoteStyle};
use super::spec::QuerySpec;
use super::sql::{LikePattern, NullTest, SqlDialect};
use super::translator::{FilterTranslator, VendorQuery};
use crate::error::Result;

const FINDER: SqlDialect = SqlDialect {
    quote: QuoteStyle::Doubled,
    null_test: NullTest::IsNull,
    like: LikePattern::Verbatim,
};

/// `q`, `orderBy`, `fields`, `limit`, `offset`, `totalResults=true`
#[derive(Debug, Clone, Copy, Default)]
pub struct FinderTranslator;

impl FilterTranslator for FinderTranslator {
    fn dialect(&self) -> &'static str {
        "finder"
    }

    fn translate(&self, spec: &QuerySpec) -> Result<VendorQuery> {
        let mut params = Vec::new();

        if let Some(q) = FINDER.conjunction(spec.conditions())? {
            params.push(("q".to_string(), q));
        }

        let order: Vec<String> = order_terms(&spec.order_by)
            .map(|t| {
                let direction = if t.descending { "desc" } else { "asc" };
                format!("{}:{direction}", t.field)
            })
            .collect();
        if !order.is_empty() {
            params.push(("orderBy".to_string(), order.join(",")));
        }

        if !spec.fields.is_empty() {
            params.push(("fields".to_string(), spec.fields.join(",")));
        }
        if spec.limit > 0 {
            params.push(("limit".to_string(), spec.limit.to_string()));
        }
        if spec.offset > 0 {
            params.push(("offset".to_string(), spec.offset.to_string()));
        }
        params.push(("totalResults".to_string(), "true".to_string()));

        Ok(VendorQuery::Params(params))
    }
}
