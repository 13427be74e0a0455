//! OData v2 rendering (SAP Gateway)

use super::filter::{literal, order_terms, quote, text, Condition, FilterOp, QuoteStyle};
use super::spec::QuerySpec;
use super::translator::{FilterTranslator, VendorQuery};
use crate::error::Result;

/// Renders `$filter`, `$orderby`, `$select`, `$top`, `$skip`, `$inlinecount`
#[derive(Debug, Clone, Copy, Default)]
pub struct ODataTranslator;

impl ODataTranslator {
    fn condition(cond: &Condition<'_>) -> Result<String> {
        let field = cond.field;
        let rendered = match cond.op {
            FilterOp::Like => format!(
                "substringof({},{field})",
                quote(&text(cond.value), QuoteStyle::Doubled)
            ),
            FilterOp::In => {
                let alternatives: Vec<String> = cond
                    .in_values()?
                    .iter()
                    .map(|v| format!("{field} eq {}", literal(v, QuoteStyle::Doubled)))
                    .collect();
                format!("({})", alternatives.join(" or "))
            }
            FilterOp::Null if cond.wants_null() => format!("{field} eq null"),
            FilterOp::Null => format!("{field} ne null"),
            op => format!(
                "{field} {} {}",
                operator(op),
                literal(cond.value, QuoteStyle::Doubled)
            ),
        };
        Ok(rendered)
    }
}

fn operator(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Ne => "ne",
        FilterOp::Gt => "gt",
        FilterOp::Gte => "ge",
        FilterOp::Lt => "lt",
        FilterOp::Lte => "le",
        _ => "eq",
    }
}

impl FilterTranslator for ODataTranslator {
    fn dialect(&self) -> &'static str {
        "odata"
    }

    fn translate(&self, spec: &QuerySpec) -> Result<VendorQuery> {
        let mut params = Vec::new();

        let clauses = spec
            .conditions()
            .map(|c| Self::condition(&c))
            .collect::<Result<Vec<_>>>()?;
        if !clauses.is_empty() {
            params.push(("$filter".to_string(), clauses.join(" and ")));
        }

        let order: Vec<String> = order_terms(&spec.order_by)
            .map(|t| {
                if t.descending {
                    format!("{} desc", t.field)
                } else {
                    t.field.to_string()
                }
            })
            .collect();
        if !order.is_empty() {
            params.push(("$orderby".to_string(), order.join(",")));
        }

        if !spec.fields.is_empty() {
            params.push(("$select".to_string(), spec.fields.join(",")));
        }
        if spec.limit > 0 {
            params.push(("$top".to_string(), spec.limit.to_string()));
        }
        if spec.offset > 0 {
            params.push(("$skip".to_string(), spec.offset.to_string()));
        }
        params.push(("$inlinecount".to_string(), "allpages".to_string()));

        Ok(VendorQuery::Params(params))
    }
}
