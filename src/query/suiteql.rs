//! SuiteQL rendering (NetSuite)

use super::filter::{order_terms, QuoteStyle};
use super::spec::QuerySpec;
use super::sql::{LikePattern, NullTest, SqlDialect};
use super::translator::{FilterTranslator, VendorQuery};
use crate::error::Result;

const SUITEQL: SqlDialect = SqlDialect {
    quote: QuoteStyle::Doubled,
    null_test: NullTest::IsNull,
    like: LikePattern::Contains,
};

/// `SELECT … FROM … WHERE … ORDER BY … OFFSET m ROWS FETCH NEXT n ROWS ONLY`
#[derive(Debug, Clone, Copy, Default)]
pub struct SuiteQlTranslator;

impl FilterTranslator for SuiteQlTranslator {
    fn dialect(&self) -> &'static str {
        "suiteql"
    }

    fn translate(&self, spec: &QuerySpec) -> Result<VendorQuery> {
        let projection = if spec.fields.is_empty() {
            "*".to_string()
        } else {
            spec.fields.join(", ")
        };
        let mut sql = format!("SELECT {projection} FROM {}", spec.entity);

        if let Some(conditions) = SUITEQL.conjunction(spec.conditions())? {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }

        let order: Vec<String> = order_terms(&spec.order_by)
            .map(|t| {
                let direction = if t.descending { "DESC" } else { "ASC" };
                format!("{} {direction}", t.field)
            })
            .collect();
        if !order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if spec.offset > 0 {
            sql.push_str(&format!(" OFFSET {} ROWS", spec.offset));
        }
        if spec.limit > 0 {
            sql.push_str(&format!(" FETCH NEXT {} ROWS ONLY", spec.limit));
        }

        Ok(VendorQuery::Statement(sql))
    }
}
