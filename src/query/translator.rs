//! Translator contract and vendor query representation

use super::spec::QuerySpec;
use super::{FinderTranslator, ODataTranslator, SoqlTranslator, SuiteQlTranslator};
use crate::error::Result;
use crate::types::SystemKind;
use std::fmt;

/// A rendered vendor query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorQuery {
    /// A query statement (SOQL, SuiteQL)
    Statement(String),
    /// Ordered URL query parameters (OData, REST finder)
    Params(Vec<(String, String)>),
}

impl VendorQuery {
    /// Human-readable form recorded in result metadata
    pub fn rendered(&self) -> String {
        match self {
            VendorQuery::Statement(statement) => statement.clone(),
            VendorQuery::Params(params) => params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&"),
        }
    }

    /// The statement, if this is one
    pub fn statement(&self) -> Option<&str> {
        match self {
            VendorQuery::Statement(statement) => Some(statement),
            VendorQuery::Params(_) => None,
        }
    }

    /// The parameters; empty for a statement
    pub fn params(&self) -> &[(String, String)] {
        match self {
            VendorQuery::Statement(_) => &[],
            VendorQuery::Params(params) => params,
        }
    }

    /// Value of one parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for VendorQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered())
    }
}

/// Turns a portable [`QuerySpec`] into one vendor's native query
pub trait FilterTranslator: Send + Sync {
    /// Dialect name (odata, soql, suiteql, finder)
    fn dialect(&self) -> &'static str;

    /// Render the query. Fails only for filters that cannot be expressed at all.
    fn translate(&self, spec: &QuerySpec) -> Result<VendorQuery>;
}

/// The translator a system speaks
pub fn translator_for(system: SystemKind) -> Box<dyn FilterTranslator> {
    match system {
        SystemKind::Sap => Box::new(ODataTranslator),
        SystemKind::Salesforce => Box::new(SoqlTranslator),
        SystemKind::Netsuite => Box::new(SuiteQlTranslator),
        SystemKind::Oracle => Box::new(FinderTranslator),
    }
}
