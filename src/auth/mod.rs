//! Authentication module
//!
//! Supports: OAuth2 client credentials, OAuth2 JWT bearer, Basic, API key
//!
//! An [`AuthStrategy`] produces credentials; the [`TokenCache`] owned by each
//! adapter decides when to refresh or reacquire them.

mod strategy;
mod token_cache;
mod types;

pub use strategy::{
    create_strategy, create_strategy_with_client, ApiKeyAuth, AuthStrategy, BasicAuth,
    ClientCredentials, JwtBearer, JwtClaims, JWT_ASSERTION_LIFETIME_SECS,
};
pub use token_cache::TokenCache;
pub use types::{AuthConfig, TokenInfo, TokenStatus, DEFAULT_EXPIRES_IN_SECS, EXPIRY_BUFFER_SECS};
