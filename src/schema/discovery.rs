//! Cached schema discovery over one adapter

use super::cache::SchemaCache;
use super::types::EntitySchema;
use crate::adapter::{OperationResult, SystemAdapter};
use std::sync::Arc;
use tracing::debug;

/// Entity listing and describe calls for one connection, with describes memoized
pub struct SchemaDiscovery {
    adapter: Arc<dyn SystemAdapter>,
    cache: SchemaCache,
}

impl SchemaDiscovery {
    pub fn new(adapter: Arc<dyn SystemAdapter>) -> Self {
        Self::with_cache(adapter, SchemaCache::default())
    }

    pub fn with_cache(adapter: Arc<dyn SystemAdapter>, cache: SchemaCache) -> Self {
        Self { adapter, cache }
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Entities the backend exposes; never cached
    pub async fn list_entities(&self) -> OperationResult {
        self.adapter.list_entities().await
    }

    /// Schema of `entity`, from cache unless stale or `force` is set.
    ///
    /// Metadata carries `cached`. A failed describe leaves the cache untouched.
    pub async fn describe(&self, entity: &str, force: bool) -> OperationResult {
        if !force {
            if let Some(schema) = self.cache.get(entity).await {
                debug!("Schema cache hit for {}", entity);
                return OperationResult::success(schema.to_value())
                    .with_message("from cache")
                    .with_metadata("cached", true);
            }
        }

        let result = self.adapter.describe_entity(entity).await;
        if !result.is_success() {
            return result;
        }

        match EntitySchema::from_value(result.into_data()) {
            Ok(schema) => {
                let schema = self.cache.put(entity, schema).await;
                OperationResult::success(schema.to_value()).with_metadata("cached", false)
            }
            Err(e) => OperationResult::from_error(&e),
        }
    }

    /// Fields of `entity` whose name or label contains `keyword`, ignoring case
    pub async fn search_fields(&self, entity: &str, keyword: &str) -> OperationResult {
        let described = self.describe(entity, false).await;
        if !described.is_success() {
            return described;
        }

        let schema = match EntitySchema::from_value(described.into_data()) {
            Ok(schema) => schema,
            Err(e) => return OperationResult::from_error(&e),
        };
        let matches = schema.search(keyword);
        let count = matches.len();

        OperationResult::success(serde_json::json!(matches))
            .with_metadata("entity", entity)
            .with_metadata("keyword", keyword)
            .with_metadata("match_count", count)
    }

    /// Forget one cached schema, or all of them
    pub async fn invalidate(&self, entity: Option<&str>) -> OperationResult {
        self.cache.invalidate(entity).await;
        let message = match entity {
            Some(entity) => format!("Schema cache cleared for {entity}"),
            None => "Schema cache cleared".to_string(),
        };
        OperationResult::ok().with_message(message)
    }
}

impl std::fmt::Debug for SchemaDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaDiscovery")
            .field("system", &self.adapter.system())
            .field("cache", &self.cache)
            .finish()
    }
}
