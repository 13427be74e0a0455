//! Portable queries and their vendor translations
//!
//! # Dialects
//!
//! | System     | Translator            | Output                                   |
//! |------------|-----------------------|------------------------------------------|
//! | SAP        | [`ODataTranslator`]   | `$filter` / `$select` / `$top` / `$skip` |
//! | Salesforce | [`SoqlTranslator`]    | `SELECT … LIMIT n OFFSET m`              |
//! | NetSuite   | [`SuiteQlTranslator`] | `SELECT … FETCH NEXT n ROWS ONLY`        |
//! | Oracle     | [`FinderTranslator`]  | `q` / `fields` / `limit` / `offset`      |

mod filter;
mod finder;
mod odata;
mod soql;
mod spec;
mod sql;
mod suiteql;
mod translator;

pub use filter::{conditions, is_truthy, parse_filter_key, Condition, FilterOp, Filters};
pub use finder::FinderTranslator;
pub use odata::ODataTranslator;
pub use soql::SoqlTranslator;
pub use spec::{QuerySpec, DEFAULT_LIMIT};
pub use suiteql::SuiteQlTranslator;
pub use translator::{translator_for, FilterTranslator, VendorQuery};

#[cfg(test)]
mod tests;
