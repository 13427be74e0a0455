//! TTL memo of entity schemas

use super::types::EntitySchema;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// How long a described schema stays fresh
pub const DEFAULT_SCHEMA_TTL: Duration = Duration::from_secs(3600);

/// Schemas keyed by the entity name they were requested under.
///
/// Entries older than the TTL read as absent until they are replaced or invalidated.
#[derive(Debug)]
pub struct SchemaCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, EntitySchema>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_TTL)
    }
}

impl SchemaCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `entity`, if any
    pub async fn get(&self, entity: &str) -> Option<EntitySchema> {
        self.get_at(entity, Utc::now().timestamp()).await
    }

    /// Like [`get`](Self::get) against an explicit clock reading (epoch seconds)
    pub async fn get_at(&self, entity: &str, now: i64) -> Option<EntitySchema> {
        let entries = self.entries.read().await;
        entries
            .get(entity)
            .filter(|schema| now - schema.fetched_at < self.ttl.as_secs() as i64)
            .cloned()
    }

    /// Store `schema`, stamping it with the current time. Returns the stamped copy.
    pub async fn put(&self, entity: &str, schema: EntitySchema) -> EntitySchema {
        self.put_at(entity, schema, Utc::now().timestamp()).await
    }

    /// Like [`put`](Self::put) with an explicit clock reading
    pub async fn put_at(&self, entity: &str, mut schema: EntitySchema, now: i64) -> EntitySchema {
        schema.fetched_at = now;
        self.entries
            .write()
            .await
            .insert(entity.to_string(), schema.clone());
        schema
    }

    /// Drop one entry, or every entry when `entity` is `None`
    pub async fn invalidate(&self, entity: Option<&str>) {
        let mut entries = self.entries.write().await;
        match entity {
            Some(entity) => {
                entries.remove(entity);
            }
            None => entries.clear(),
        }
    }

    /// Number of stored entries, fresh or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
