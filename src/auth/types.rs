//! Auth configuration and token types

use crate::types::{JsonObject, JwtAlgorithm};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds before `expires_at` at which a token already counts as expired
pub const EXPIRY_BUFFER_SECS: i64 = 30;

/// Lifetime assumed when a token endpoint omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Authentication block of a connection profile, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// OAuth2 client credentials grant
    Oauth2ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Space-separated scopes, omitted from the request when empty
        #[serde(default)]
        scope: String,
        /// Additional token request form parameters
        #[serde(default)]
        extra_params: BTreeMap<String, String>,
    },

    /// OAuth2 JWT bearer grant (RFC 7523)
    Oauth2JwtBearer {
        /// Token endpoint URL
        token_url: String,
        /// Client ID, used as the `iss` claim
        client_id: String,
        /// HMAC secret, or a PEM private key for RS*/ES* algorithms
        private_key: String,
        /// `sub` claim (usually the integration user)
        subject: String,
        /// `aud` claim; defaults to the token URL
        #[serde(default)]
        audience: String,
        /// Space-separated scopes
        #[serde(default)]
        scope: String,
        /// Assertion signing algorithm
        #[serde(default)]
        algorithm: JwtAlgorithm,
    },

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// Static API key in a header
    ApiKey {
        /// The API key value
        api_key: String,
        /// Header carrying the key
        #[serde(default = "default_header_name")]
        header_name: String,
        /// Prefix placed before the key, separated by a space
        #[serde(default = "default_prefix")]
        prefix: String,
    },
}

fn default_header_name() -> String {
    "Authorization".to_string()
}

fn default_prefix() -> String {
    "Bearer".to_string()
}

impl AuthConfig {
    /// The `type` tag as written in config files
    pub fn type_name(&self) -> &'static str {
        match self {
            AuthConfig::Oauth2ClientCredentials { .. } => "oauth2_client_credentials",
            AuthConfig::Oauth2JwtBearer { .. } => "oauth2_jwt_bearer",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::ApiKey { .. } => "api_key",
        }
    }
}

/// Credential produced by an auth strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Token value placed on the wire
    pub access_token: String,
    /// Scheme used in the Authorization header
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Epoch seconds, 0 = never expires
    #[serde(default)]
    pub expires_at: i64,
    /// Refresh credential, when the grant issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Any other fields returned by the token endpoint
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: JsonObject,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenInfo {
    /// Create a token that never expires
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: 0,
            refresh_token: None,
            extra: JsonObject::new(),
        }
    }

    /// Set expiry to `seconds` from now
    #[must_use]
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_at = Utc::now().timestamp() + seconds;
        self
    }

    /// Attach a refresh token
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token;
        self
    }

    /// True when the token is past (or within 30s of) its expiry
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Expiry check against an explicit clock reading
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at != 0 && now >= self.expires_at - EXPIRY_BUFFER_SECS
    }

    /// Whether a refresh grant can be attempted instead of full re-authentication
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Lifecycle position of a connection's cached credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Nothing acquired yet, or discarded by a reconnect
    NoToken,
    /// Cached and usable
    Valid,
    /// Cached but must be refreshed or reacquired before use
    Expired,
}

impl TokenStatus {
    /// Classify an optional cached token
    pub fn of(token: Option<&TokenInfo>) -> Self {
        match token {
            None => TokenStatus::NoToken,
            Some(t) if t.is_expired() => TokenStatus::Expired,
            Some(_) => TokenStatus::Valid,
        }
    }
}
