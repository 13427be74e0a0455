//! Per-connection token cache
//!
//! Holds at most one [`TokenInfo`] and walks it through
//! NoToken → Valid → Expired → (refresh | reacquire) → Valid.

use super::strategy::{create_strategy, AuthStrategy};
use super::types::{AuthConfig, TokenInfo, TokenStatus};
use crate::error::{Error, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Cached credential for one adapter, plus the strategy that produces it
pub struct TokenCache {
    strategy: Box<dyn AuthStrategy>,
    // Held across acquisition, so concurrent callers wait for one token request
    token: Mutex<Option<TokenInfo>>,
    // Upper bound on one acquire or refresh round trip
    timeout: Option<Duration>,
}

impl TokenCache {
    /// Wrap a strategy with an empty cache
    pub fn new(strategy: Box<dyn AuthStrategy>) -> Self {
        Self {
            strategy,
            token: Mutex::new(None),
            timeout: None,
        }
    }

    /// Build the strategy from config and wrap it. Token calls give up after `timeout`.
    pub fn from_config(config: &AuthConfig, timeout: Duration) -> Self {
        Self::new(create_strategy(config)).with_timeout(timeout)
    }

    /// Bound every acquire or refresh by `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The underlying strategy
    pub fn strategy(&self) -> &dyn AuthStrategy {
        self.strategy.as_ref()
    }

    /// Where the cached credential currently sits in its lifecycle
    pub async fn status(&self) -> TokenStatus {
        TokenStatus::of(self.token.lock().await.as_ref())
    }

    /// Return a usable token, refreshing or reacquiring it when needed
    pub async fn get_token(&self) -> Result<TokenInfo> {
        let mut slot = self.token.lock().await;

        let fresh = match slot.as_ref() {
            Some(token) if !token.is_expired() => return Ok(token.clone()),
            Some(token) if token.can_refresh() => {
                debug!("Refreshing expired {} token", self.strategy.kind());
                self.bounded(self.strategy.refresh_token(token)).await?
            }
            _ => {
                debug!("Acquiring {} token", self.strategy.kind());
                self.bounded(self.strategy.acquire_token()).await?
            }
        };

        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    async fn bounded(&self, call: impl Future<Output = Result<TokenInfo>>) -> Result<TokenInfo> {
        let Some(timeout) = self.timeout else {
            return call.await;
        };
        tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| Error::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
    }

    /// Header pairs for the current token
    pub async fn auth_headers(&self) -> Result<Vec<(String, String)>> {
        let token = self.get_token().await?;
        Ok(self.strategy.auth_headers(&token))
    }

    /// Drop the cached token
    pub async fn clear(&self) {
        *self.token.lock().await = None;
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("strategy", &self.strategy)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
