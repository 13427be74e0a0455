//! SOQL rendering (Salesforce)

use super::filter::{order_terms, QuoteStyle};
use super::spec::QuerySpec;
use super::sql::{LikePattern, NullTest, SqlDialect};
use super::translator::{FilterTranslator, VendorQuery};
use crate::error::Result;

const SOQL: SqlDialect = SqlDialect {
    quote: QuoteStyle::Backslash,
    null_test: NullTest::Equality,
    like: LikePattern::Verbatim,
};

/// `SELECT … FROM … WHERE … ORDER BY … LIMIT n OFFSET m`
#[derive(Debug, Clone, Copy, Default)]
pub struct SoqlTranslator;

impl FilterTranslator for SoqlTranslator {
    fn dialect(&self) -> &'static str {
        "soql"
    }

    fn translate(&self, spec: &QuerySpec) -> Result<VendorQuery> {
        let projection = if spec.fields.is_empty() {
            "FIELDS(ALL)".to_string()
        } else {
            spec.fields.join(", ")
        };
        let mut soql = format!("SELECT {projection} FROM {}", spec.entity);

        if let Some(conditions) = SOQL.conjunction(spec.conditions())? {
            soql.push_str(" WHERE ");
            soql.push_str(&conditions);
        }

        let order: Vec<String> = order_terms(&spec.order_by)
            .map(|t| {
                if t.descending {
                    format!("{} DESC", t.field)
                } else {
                    t.field.to_string()
                }
            })
            .collect();
        if !order.is_empty() {
            soql.push_str(" ORDER BY ");
            soql.push_str(&order.join(", "));
        }

        if spec.limit > 0 {
            soql.push_str(&format!(" LIMIT {}", spec.limit));
        }
        if spec.offset > 0 {
            soql.push_str(&format!(" OFFSET {}", spec.offset));
        }

        Ok(VendorQuery::Statement(soql))
    }
}
