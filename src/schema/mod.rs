//! Schema discovery module
//!
//! Normalizes each backend's describe output into [`EntitySchema`] and keeps
//! described schemas in a TTL cache.
//!
//! # Features
//!
//! - **Uniform metadata**: one field model across OData, sObject, record and resource APIs
//! - **TTL cache**: describes are memoized per entity for an hour by default
//! - **Field search**: case-insensitive keyword match over names and labels

mod cache;
mod discovery;
mod types;

pub use cache::{SchemaCache, DEFAULT_SCHEMA_TTL};
pub use discovery::SchemaDiscovery;
pub use types::{EntitySchema, FieldInfo, DEFAULT_KEY_FIELD};
