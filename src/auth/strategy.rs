//! Auth strategies
//!
//! One implementation per credential flow. A strategy only knows how to
//! produce a [`TokenInfo`] and how to put it on the wire; caching and the
//! refresh-vs-reacquire decision live in [`TokenCache`](super::TokenCache).

use super::types::{AuthConfig, TokenInfo, DEFAULT_EXPIRES_IN_SECS};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, JwtAlgorithm};
use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifetime of a JWT-bearer assertion
pub const JWT_ASSERTION_LIFETIME_SECS: i64 = 300;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Produces credentials and the headers that carry them
#[async_trait]
pub trait AuthStrategy: Send + Sync + fmt::Debug {
    /// Config tag of this strategy
    fn kind(&self) -> &'static str;

    /// Full (re-)authentication
    async fn acquire_token(&self) -> Result<TokenInfo>;

    /// Exchange or re-derive an expired token. Re-acquires unless overridden.
    async fn refresh_token(&self, _current: &TokenInfo) -> Result<TokenInfo> {
        self.acquire_token().await
    }

    /// Header pairs carrying `token`
    fn auth_headers(&self, token: &TokenInfo) -> Vec<(String, String)> {
        vec![(
            "Authorization".to_string(),
            format!("{} {}", token.token_type, token.access_token),
        )]
    }
}

/// Build the strategy named by a profile's `auth.type`
pub fn create_strategy(config: &AuthConfig) -> Box<dyn AuthStrategy> {
    create_strategy_with_client(config, Client::new())
}

/// Same as [`create_strategy`], reusing an existing HTTP client for token calls
pub fn create_strategy_with_client(config: &AuthConfig, http: Client) -> Box<dyn AuthStrategy> {
    match config.clone() {
        AuthConfig::Oauth2ClientCredentials {
            token_url,
            client_id,
            client_secret,
            scope,
            extra_params,
        } => Box::new(ClientCredentials {
            token_url,
            client_id,
            client_secret,
            scope,
            extra_params,
            http,
        }),
        AuthConfig::Oauth2JwtBearer {
            token_url,
            client_id,
            private_key,
            subject,
            audience,
            scope,
            algorithm,
        } => Box::new(JwtBearer {
            token_url,
            client_id,
            private_key,
            subject,
            audience,
            scope,
            algorithm,
            http,
        }),
        AuthConfig::Basic { username, password } => Box::new(BasicAuth { username, password }),
        AuthConfig::ApiKey {
            api_key,
            header_name,
            prefix,
        } => Box::new(ApiKeyAuth {
            api_key,
            header_name,
            prefix,
        }),
    }
}

// ============================================================================
// OAuth2 client credentials
// ============================================================================

/// OAuth2 client credentials grant
pub struct ClientCredentials {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    extra_params: BTreeMap<String, String>,
    http: Client,
}

#[async_trait]
impl AuthStrategy for ClientCredentials {
    fn kind(&self) -> &'static str {
        "oauth2_client_credentials"
    }

    async fn acquire_token(&self) -> Result<TokenInfo> {
        let mut form = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
        ];
        for (key, value) in &self.extra_params {
            form.push((key.as_str(), value.clone()));
        }
        if !self.scope.is_empty() {
            form.push(("scope", self.scope.clone()));
        }

        let response = post_token_form(&self.http, &self.token_url, &form).await?;
        Ok(response.into_token_info())
    }

    async fn refresh_token(&self, current: &TokenInfo) -> Result<TokenInfo> {
        let Some(refresh_token) = current.refresh_token.clone() else {
            return self.acquire_token().await;
        };

        let form = [
            ("grant_type", "refresh_token".to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("refresh_token", refresh_token.clone()),
        ];

        let response = post_token_form(&self.http, &self.token_url, &form)
            .await
            .map_err(|e| Error::TokenRefresh {
                message: e.to_string(),
            })?;

        let mut token = response.into_token_info();
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }
        Ok(token)
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// OAuth2 JWT bearer
// ============================================================================

/// OAuth2 JWT bearer grant: a signed assertion exchanged for an access token
pub struct JwtBearer {
    token_url: String,
    client_id: String,
    private_key: String,
    subject: String,
    audience: String,
    scope: String,
    algorithm: JwtAlgorithm,
    http: Client,
}

/// Claims of the JWT-bearer assertion
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer (client ID)
    pub iss: String,
    /// Subject
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

impl JwtBearer {
    /// Build from a `oauth2_jwt_bearer` config block; `None` for other auth types
    pub fn from_config(config: &AuthConfig, http: Client) -> Option<Self> {
        let AuthConfig::Oauth2JwtBearer {
            token_url,
            client_id,
            private_key,
            subject,
            audience,
            scope,
            algorithm,
        } = config.clone()
        else {
            return None;
        };
        Some(Self {
            token_url,
            client_id,
            private_key,
            subject,
            audience,
            scope,
            algorithm,
            http,
        })
    }

    /// Sign an assertion issued at `now`
    pub fn build_assertion(&self, now: i64) -> Result<String> {
        let audience = if self.audience.is_empty() {
            self.token_url.clone()
        } else {
            self.audience.clone()
        };

        let claims = JwtClaims {
            iss: self.client_id.clone(),
            sub: self.subject.clone(),
            aud: audience,
            iat: now,
            exp: now + JWT_ASSERTION_LIFETIME_SECS,
        };

        let key = self.encoding_key()?;
        encode(&Header::new(self.algorithm.into()), &claims, &key).map_err(|e| {
            Error::JwtGeneration {
                message: format!("Failed to encode JWT: {e}"),
            }
        })
    }

    fn encoding_key(&self) -> Result<EncodingKey> {
        let pem = self.private_key.as_bytes();
        let key = match self.algorithm {
            alg if alg.is_hmac() => return Ok(EncodingKey::from_secret(pem)),
            JwtAlgorithm::ES256 | JwtAlgorithm::ES384 => EncodingKey::from_ec_pem(pem),
            _ => EncodingKey::from_rsa_pem(pem),
        };
        key.map_err(|e| Error::JwtGeneration {
            message: format!("Invalid private key: {e}"),
        })
    }
}

#[async_trait]
impl AuthStrategy for JwtBearer {
    fn kind(&self) -> &'static str {
        "oauth2_jwt_bearer"
    }

    async fn acquire_token(&self) -> Result<TokenInfo> {
        let assertion = self.build_assertion(Utc::now().timestamp())?;

        let mut form = vec![
            ("grant_type", JWT_BEARER_GRANT.to_string()),
            ("assertion", assertion),
        ];
        if !self.scope.is_empty() {
            form.push(("scope", self.scope.clone()));
        }

        let response = post_token_form(&self.http, &self.token_url, &form).await?;
        Ok(response.into_token_info())
    }
}

impl fmt::Debug for JwtBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtBearer")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("subject", &self.subject)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Static credentials
// ============================================================================

/// HTTP Basic authentication
pub struct BasicAuth {
    username: String,
    password: String,
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn kind(&self) -> &'static str {
        "basic"
    }

    async fn acquire_token(&self) -> Result<TokenInfo> {
        let digest = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        Ok(TokenInfo::new(digest, "Basic"))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Static API key sent in a configurable header
pub struct ApiKeyAuth {
    api_key: String,
    header_name: String,
    prefix: String,
}

#[async_trait]
impl AuthStrategy for ApiKeyAuth {
    fn kind(&self) -> &'static str {
        "api_key"
    }

    async fn acquire_token(&self) -> Result<TokenInfo> {
        Ok(TokenInfo::new(self.api_key.clone(), self.prefix.clone()))
    }

    fn auth_headers(&self, token: &TokenInfo) -> Vec<(String, String)> {
        let value = if self.prefix.is_empty() {
            token.access_token.clone()
        } else {
            format!("{} {}", self.prefix, token.access_token)
        };
        vec![(self.header_name.clone(), value)]
    }
}

impl fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("header_name", &self.header_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Token endpoint plumbing
// ============================================================================

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<JsonValue>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(flatten)]
    extra: JsonObject,
}

impl TokenResponse {
    fn into_token_info(self) -> TokenInfo {
        // Some servers send expires_in as a string
        let expires_in = match &self.expires_in {
            Some(JsonValue::Number(n)) => n.as_i64(),
            Some(JsonValue::String(s)) => s.parse().ok(),
            _ => None,
        }
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        let mut token = TokenInfo::new(
            self.access_token,
            self.token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
        )
        .expires_in(expires_in)
        .with_refresh_token(self.refresh_token);
        token.extra = self.extra;
        token
    }
}

/// POST a form to a token endpoint and parse the token response
async fn post_token_form(
    http: &Client,
    token_url: &str,
    form: &[(&str, String)],
) -> Result<TokenResponse> {
    tracing::debug!("Requesting token from {}", token_url);

    let response = http
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(Error::Http)?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(Error::OAuth2 {
            message: format!(
                "Token request failed with status {}: {body}",
                status.as_u16()
            ),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::OAuth2 {
        message: format!("Invalid token response: {e}"),
    })
}
