//! Vendor adapters behind one uniform contract
//!
//! # Overview
//!
//! Every backend implements [`SystemAdapter`]:
//! - lifecycle: `connect`, `disconnect`, `health_check`
//! - reads: `query`, `get_record`
//! - writes: `create_record`, `update_record`, `delete_record`
//! - schema: `list_entities`, `describe_entity`
//! - escape hatch: `execute_raw`
//!
//! No operation returns an error. Transport, status, auth and translation
//! failures all come back as a failed [`OperationResult`].

mod netsuite;
mod odata_metadata;
mod oracle;
mod result;
mod salesforce;
mod sap;
mod shared;

pub use netsuite::NetSuiteAdapter;
pub use oracle::OracleAdapter;
pub use result::{ConnectionStatus, OperationResult};
pub use salesforce::SalesforceAdapter;
pub use sap::SapAdapter;

use crate::config::ConnectionProfile;
use crate::query::QuerySpec;
use crate::types::{JsonValue, SystemKind};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Uniform operations over one enterprise backend
#[async_trait]
pub trait SystemAdapter: Send + Sync {
    /// Backend this adapter talks to
    fn system(&self) -> SystemKind;

    /// Current connection status
    fn status(&self) -> ConnectionStatus;

    /// Drop any transport, token and CSRF state, then probe the backend
    async fn connect(&self) -> OperationResult;

    /// Drop transport, token and CSRF state
    async fn disconnect(&self) -> OperationResult;

    /// Lightweight reachability and credential check
    async fn health_check(&self) -> OperationResult;

    /// Run a portable query. Metadata carries `query`, `total_count` and `has_more`.
    async fn query(&self, spec: &QuerySpec) -> OperationResult;

    async fn get_record(&self, entity: &str, id: &str) -> OperationResult;

    async fn create_record(&self, entity: &str, data: JsonValue) -> OperationResult;

    async fn update_record(&self, entity: &str, id: &str, data: JsonValue) -> OperationResult;

    async fn delete_record(&self, entity: &str, id: &str) -> OperationResult;

    /// Entities (entity sets, sObjects, record types, resources) the backend exposes
    async fn list_entities(&self) -> OperationResult;

    /// Field-level schema of one entity, as [`EntitySchema`](crate::schema::EntitySchema) JSON
    async fn describe_entity(&self, entity: &str) -> OperationResult;

    /// Send an arbitrary request through the authenticated transport.
    /// `method` is one of GET, POST, PUT, PATCH, DELETE.
    async fn execute_raw(&self, method: &str, path: &str, body: Option<JsonValue>)
        -> OperationResult;
}

impl fmt::Debug for dyn SystemAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemAdapter")
            .field("system", &self.system())
            .field("status", &self.status())
            .finish()
    }
}

/// Build the adapter for a profile's system
pub fn create_adapter(profile: &ConnectionProfile) -> Arc<dyn SystemAdapter> {
    match profile.system {
        SystemKind::Sap => Arc::new(SapAdapter::new(profile)),
        SystemKind::Salesforce => Arc::new(SalesforceAdapter::new(profile)),
        SystemKind::Netsuite => Arc::new(NetSuiteAdapter::new(profile)),
        SystemKind::Oracle => Arc::new(OracleAdapter::new(profile)),
    }
}

#[cfg(test)]
mod tests;
