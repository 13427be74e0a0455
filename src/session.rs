//! Named connections opened on demand from a [`BridgeConfig`]

use crate::adapter::{create_adapter, SystemAdapter};
use crate::config::{BridgeConfig, ConnectionProfile};
use crate::engine::QueryEngine;
use crate::error::{Error, Result};
use crate::schema::SchemaDiscovery;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{info, warn};

/// One connected profile: its adapter and the services layered on it
#[derive(Debug)]
pub struct Connection {
    pub name: String,
    pub adapter: Arc<dyn SystemAdapter>,
    pub discovery: SchemaDiscovery,
    pub engine: QueryEngine,
}

impl Connection {
    fn new(name: &str, adapter: Arc<dyn SystemAdapter>) -> Self {
        Self {
            name: name.to_string(),
            discovery: SchemaDiscovery::new(Arc::clone(&adapter)),
            engine: QueryEngine::new(Arc::clone(&adapter)),
            adapter,
        }
    }
}

// Filled once per connection name; a failed connect leaves it empty
type Slot = Arc<OnceCell<Arc<Connection>>>;

/// Owns the configuration and every open connection.
///
/// The connection map is only locked to find or insert a slot and never
/// while the config lock is held. Opening one profile never blocks calls on
/// another.
#[derive(Debug)]
pub struct Session {
    config: RwLock<BridgeConfig>,
    connections: Mutex<HashMap<String, Slot>>,
}

impl Session {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: RwLock::new(config),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Configured profile names, sorted
    pub async fn profile_names(&self) -> Vec<String> {
        self.config.read().await.profile_names()
    }

    /// Profile name, system, base URL and status of every configured connection
    pub async fn describe_profiles(&self) -> Vec<serde_json::Value> {
        let profiles: Vec<(String, ConnectionProfile)> = self
            .config
            .read()
            .await
            .connections
            .iter()
            .map(|(name, profile)| (name.clone(), profile.clone()))
            .collect();
        let open = self.open_connections().await;

        profiles
            .into_iter()
            .map(|(name, profile)| {
                let status = open
                    .iter()
                    .find(|conn| conn.name == name)
                    .map_or("disconnected", |conn| conn.adapter.status().as_str());
                serde_json::json!({
                    "name": name,
                    "system": profile.system,
                    "base_url": profile.base_url,
                    "status": status,
                })
            })
            .collect()
    }

    /// The open connection for `name`, connecting it first if needed.
    ///
    /// Concurrent callers for the same name share one connect. A failed
    /// connect is not remembered; the next call tries again.
    pub async fn connection(&self, name: &str) -> Result<Arc<Connection>> {
        let profile = self.config.read().await.profile(name)?.clone();
        let slot = Arc::clone(
            self.connections
                .lock()
                .await
                .entry(name.to_string())
                .or_default(),
        );

        let conn = slot.get_or_try_init(|| Self::open(name, profile)).await?;
        Ok(Arc::clone(conn))
    }

    async fn open(name: &str, profile: ConnectionProfile) -> Result<Arc<Connection>> {
        let adapter = create_adapter(&profile);
        let result = adapter.connect().await;
        if !result.is_success() {
            warn!("Connection '{}' failed: {}", name, result.message());
            return Err(Error::ConnectionCheck {
                message: format!("{name}: {}", result.message()),
            });
        }

        info!("Opened connection '{}' ({})", name, profile.system);
        Ok(Arc::new(Connection::new(name, adapter)))
    }

    /// Swap in `config`, then disconnect everything opened under the old one
    pub async fn reload(&self, config: BridgeConfig) {
        *self.config.write().await = config;
        self.shutdown().await;
    }

    /// Disconnect every open connection and forget it
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<Connection>> = self
            .connections
            .lock()
            .await
            .drain()
            .filter_map(|(_, slot)| slot.get().cloned())
            .collect();
        if drained.is_empty() {
            return;
        }

        info!("Closing {} connection(s)", drained.len());
        join_all(drained.iter().map(|conn| conn.adapter.disconnect())).await;
    }

    /// Number of open connections
    pub async fn open_count(&self) -> usize {
        self.open_connections().await.len()
    }

    async fn open_connections(&self) -> Vec<Arc<Connection>> {
        self.connections
            .lock()
            .await
            .values()
            .filter_map(|slot| slot.get().cloned())
            .collect()
    }
}
