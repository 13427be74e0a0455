//! Condition rendering shared by the SQL-like dialects (SOQL, SuiteQL, REST finder)

use super::filter::{literal, quote, text, Condition, FilterOp, QuoteStyle};
use crate::error::Result;

/// How a dialect tests for null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NullTest {
    /// `F = null` / `F != null`
    Equality,
    /// `F IS NULL` / `F IS NOT NULL`
    IsNull,
}

/// Where `__like` puts wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LikePattern {
    /// Value passed through; caller supplies wildcards
    Verbatim,
    /// `%value%`
    Contains,
}

/// Per-dialect knobs for SQL-like condition rendering
#[derive(Debug, Clone, Copy)]
pub(crate) struct SqlDialect {
    pub quote: QuoteStyle,
    pub null_test: NullTest,
    pub like: LikePattern,
}

impl SqlDialect {
    /// Render one condition
    pub(crate) fn condition(&self, cond: &Condition<'_>) -> Result<String> {
        let field = cond.field;
        let rendered = match cond.op {
            FilterOp::Like => {
                let pattern = match self.like {
                    LikePattern::Verbatim => text(cond.value),
                    LikePattern::Contains => format!("%{}%", text(cond.value)),
                };
                format!("{field} LIKE {}", quote(&pattern, self.quote))
            }
            FilterOp::In => {
                let items: Vec<String> = cond
                    .in_values()?
                    .iter()
                    .map(|v| literal(v, self.quote))
                    .collect();
                format!("{field} IN ({})", items.join(", "))
            }
            FilterOp::Null => match (self.null_test, cond.wants_null()) {
                (NullTest::Equality, true) => format!("{field} = null"),
                (NullTest::Equality, false) => format!("{field} != null"),
                (NullTest::IsNull, true) => format!("{field} IS NULL"),
                (NullTest::IsNull, false) => format!("{field} IS NOT NULL"),
            },
            op => format!(
                "{field} {} {}",
                comparison(op),
                literal(cond.value, self.quote)
            ),
        };
        Ok(rendered)
    }

    /// Render every condition and join them with ` AND `; `None` when there are none
    pub(crate) fn conjunction<'a>(
        &self,
        conditions: impl Iterator<Item = Condition<'a>>,
    ) -> Result<Option<String>> {
        let clauses = conditions
            .map(|c| self.condition(&c))
            .collect::<Result<Vec<_>>>()?;
        Ok((!clauses.is_empty()).then(|| clauses.join(" AND ")))
    }
}

fn comparison(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Ne => "!=",
        FilterOp::Gt => ">",
        FilterOp::Gte => ">=",
        FilterOp::Lt => "<",
        FilterOp::Lte => "<=",
        _ => "=",
    }
}
