//! Connection profiles loaded from YAML
//!
//! A config file maps connection names to profiles:
//!
//! ```yaml
//! connections:
//!   my_sap:
//!     system: sap
//!     base_url: https://my-sap.example.com
//!     auth: { type: basic, username: u, password: p }
//!     options: { timeout_secs: 30 }
//! ```
//!
//! Secrets can stay out of the file: `EB_{NAME}_CLIENT_ID`, `EB_{NAME}_CLIENT_SECRET`,
//! `EB_{NAME}_USERNAME`, `EB_{NAME}_PASSWORD`, `EB_{NAME}_API_KEY`,
//! `EB_{NAME}_TOKEN_URL` and `EB_{NAME}_BASE_URL` are merged in before the
//! profile is deserialized.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::DEFAULT_TIMEOUT;
use crate::types::{JsonObject, SystemKind};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "ENTERPRISE_BRIDGE_CONFIG";

/// Auth fields that can be supplied through `EB_{NAME}_{FIELD}`
const AUTH_ENV_FIELDS: [&str; 6] = [
    "client_id",
    "client_secret",
    "username",
    "password",
    "api_key",
    "token_url",
];

// ============================================================================
// Types
// ============================================================================

/// Whole config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Profiles keyed by connection name
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionProfile>,
}

/// One named connection to one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Connection name (the key in `connections`)
    #[serde(default)]
    pub name: String,

    /// Backend system
    pub system: SystemKind,

    /// Instance root URL
    pub base_url: String,

    /// Credentials
    pub auth: AuthConfig,

    /// Per-system knobs
    #[serde(default)]
    pub options: AdapterOptions,
}

/// Optional per-connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterOptions {
    /// API version segment (Salesforce `v59.0`, Oracle `v1`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// NetSuite account id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Request timeout override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Anything else, kept for forward compatibility
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl AdapterOptions {
    /// Request timeout, falling back to the transport default
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs)
    }
}

impl ConnectionProfile {
    /// Build a profile in code
    pub fn new(
        name: impl Into<String>,
        system: SystemKind,
        base_url: impl Into<String>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            name: name.into(),
            system,
            base_url: base_url.into(),
            auth,
            options: AdapterOptions::default(),
        }
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: AdapterOptions) -> Self {
        self.options = options;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfigValue {
                field: format!("connections.{}.base_url", self.name),
                message: "cannot be empty".to_string(),
            });
        }
        url::Url::parse(&self.base_url).map_err(|e| Error::InvalidConfigValue {
            field: format!("connections.{}.base_url", self.name),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

impl BridgeConfig {
    /// Load from `path`, `$ENTERPRISE_BRIDGE_CONFIG`, or
    /// `~/.enterprise-bridge/config.yaml`, in that order.
    ///
    /// A missing file is an empty config, not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let Some(path) = resolve_path(path, &env) else {
            debug!("No config path could be resolved; using an empty config");
            return Ok(Self::default());
        };
        Self::load_file(&path, &env)
    }

    fn load_file(path: &Path, env: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        if !path.exists() {
            debug!("Config file {} not found; using an empty config", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str_with_env(&content, env)
    }

    /// Parse YAML (or JSON) text, applying overrides from the process environment
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_yaml_str_with_env(yaml, &|key| std::env::var(key).ok())
    }

    /// Parse YAML text with an injectable environment lookup
    pub fn from_yaml_str_with_env(
        yaml: &str,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut raw: YamlValue = serde_yaml::from_str(yaml)?;
        if raw.is_null() {
            return Ok(Self::default());
        }
        apply_env_overrides(&mut raw, env);

        let mut config: BridgeConfig = serde_yaml::from_value(raw)?;
        for (name, profile) in &mut config.connections {
            profile.name.clone_from(name);
            profile.validate()?;
        }
        Ok(config)
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&ConnectionProfile> {
        self.connections
            .get(name)
            .ok_or_else(|| Error::profile_not_found(name, self.connections.keys()))
    }

    /// Configured connection names, sorted
    pub fn profile_names(&self) -> Vec<String> {
        self.connections.keys().cloned().collect()
    }

    /// Commented example covering all four systems
    pub fn generate_template() -> &'static str {
        TEMPLATE
    }

    /// Write [`generate_template`](Self::generate_template) to `path`.
    /// An existing file is only replaced when `force` is set.
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(Error::config(format!(
                "'{}' already exists; pass --force to overwrite it",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, TEMPLATE)?;
        Ok(())
    }
}

/// `~/.enterprise-bridge/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".enterprise-bridge").join("config.yaml"))
}

fn resolve_path(explicit: Option<&Path>, env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

/// `my-sap` → `EB_MY_SAP_`
fn env_prefix(profile: &str) -> String {
    let name: String = profile
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("EB_{name}_")
}

fn apply_env_overrides(raw: &mut YamlValue, env: &dyn Fn(&str) -> Option<String>) {
    let Some(connections) = raw
        .get_mut("connections")
        .and_then(YamlValue::as_mapping_mut)
    else {
        return;
    };

    for (name, profile) in connections.iter_mut() {
        let (Some(name), Some(profile)) = (name.as_str(), profile.as_mapping_mut()) else {
            continue;
        };
        let prefix = env_prefix(name);

        if let Some(base_url) = env(&format!("{prefix}BASE_URL")) {
            debug!("Overriding base_url of '{}' from the environment", name);
            profile.insert("base_url".into(), base_url.into());
        }

        for field in AUTH_ENV_FIELDS {
            let Some(value) = env(&format!("{prefix}{}", field.to_ascii_uppercase())) else {
                continue;
            };
            debug!("Overriding auth.{} of '{}' from the environment", field, name);
            let auth = profile
                .entry("auth".into())
                .or_insert_with(|| YamlValue::Mapping(Mapping::new()));
            if !auth.is_mapping() {
                *auth = YamlValue::Mapping(Mapping::new());
            }
            if let Some(auth) = auth.as_mapping_mut() {
                auth.insert(field.into(), value.into());
            }
        }
    }
}

const TEMPLATE: &str = r#"# enterprise-bridge configuration
#
# Secrets may be left out of this file and supplied per connection through
# EB_{NAME}_CLIENT_ID, EB_{NAME}_CLIENT_SECRET, EB_{NAME}_USERNAME,
# EB_{NAME}_PASSWORD, EB_{NAME}_API_KEY, EB_{NAME}_TOKEN_URL, EB_{NAME}_BASE_URL.

connections:
  # SAP S/4HANA via OData v2
  sap_prod:
    system: sap
    base_url: https://my-sap-host.example.com
    auth:
      type: basic
      username: SAP_USER
      password: change-me
    options:
      timeout_secs: 60

  # Salesforce REST + SOQL
  salesforce:
    system: salesforce
    base_url: https://my-org.my.salesforce.com
    auth:
      type: oauth2_client_credentials
      token_url: https://my-org.my.salesforce.com/services/oauth2/token
      client_id: your-client-id
      client_secret: your-client-secret
    options:
      api_version: v59.0

  # NetSuite REST + SuiteQL
  netsuite:
    system: netsuite
    base_url: https://1234567.suitetalk.api.netsuite.com
    auth:
      type: oauth2_client_credentials
      token_url: https://1234567.suitetalk.api.netsuite.com/services/rest/auth/oauth2/v1/token
      client_id: your-client-id
      client_secret: your-client-secret
    options:
      account_id: "1234567"

  # Oracle Fusion Cloud REST
  oracle_fusion:
    system: oracle
    base_url: https://my-pod.fa.ocs.oraclecloud.com
    auth:
      type: basic
      username: integration.user
      password: change-me
    options:
      api_version: v1
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_profiles() {
        let yaml = r"
connections:
  my_sap:
    system: sap
    base_url: https://sap.example.com
    auth: { type: basic, username: u, password: p }
    options: { timeout_secs: 30, client: '100' }
";
        let config = BridgeConfig::from_yaml_str_with_env(yaml, &no_env).unwrap();
        let profile = config.profile("my_sap").unwrap();

        assert_eq!(profile.name, "my_sap");
        assert_eq!(profile.system, SystemKind::Sap);
        assert_eq!(profile.options.timeout(), Duration::from_secs(30));
        assert_eq!(profile.options.extra.get("client").unwrap(), "100");
        assert_eq!(
            profile.auth,
            AuthConfig::Basic {
                username: "u".into(),
                password: "p".into()
            }
        );
    }

    #[test]
    fn test_empty_document() {
        let config = BridgeConfig::from_yaml_str_with_env("", &no_env).unwrap();
        assert!(config.connections.is_empty());
    }

    #[test]
    fn test_env_overrides_auth_and_base_url() {
        let yaml = r"
connections:
  sfdc:
    system: salesforce
    base_url: https://placeholder.example.com
    auth:
      type: oauth2_client_credentials
      token_url: https://login.example.com/token
";
        let env = env_from(&[
            ("EB_SFDC_CLIENT_ID", "id-from-env"),
            ("EB_SFDC_CLIENT_SECRET", "secret-from-env"),
            ("EB_SFDC_BASE_URL", "https://real.my.salesforce.com"),
        ]);
        let config = BridgeConfig::from_yaml_str_with_env(yaml, &env).unwrap();
        let profile = config.profile("sfdc").unwrap();

        assert_eq!(profile.base_url, "https://real.my.salesforce.com");
        match &profile.auth {
            AuthConfig::Oauth2ClientCredentials {
                client_id,
                client_secret,
                token_url,
                ..
            } => {
                assert_eq!(client_id, "id-from-env");
                assert_eq!(client_secret, "secret-from-env");
                assert_eq!(token_url, "https://login.example.com/token");
            }
            other => panic!("unexpected auth: {other:?}"),
        }
    }

    #[test]
    fn test_env_prefix_normalizes_name() {
        assert_eq!(env_prefix("my-sap"), "EB_MY_SAP_");
        assert_eq!(env_prefix("prod"), "EB_PROD_");
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let config = BridgeConfig::from_yaml_str_with_env(TEMPLATE, &no_env).unwrap();
        let err = config.profile("missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Connection 'missing' not found. Available: netsuite, oracle_fusion, salesforce, sap_prod"
        );
    }

    #[test]
    fn test_unknown_auth_type_is_error() {
        let yaml = r"
connections:
  x:
    system: oracle
    base_url: https://oracle.example.com
    auth: { type: kerberos }
";
        assert!(BridgeConfig::from_yaml_str_with_env(yaml, &no_env).is_err());
    }

    #[test]
    fn test_unknown_system_is_error() {
        let yaml = r"
connections:
  x:
    system: workday
    base_url: https://example.com
    auth: { type: basic, username: u, password: p }
";
        assert!(BridgeConfig::from_yaml_str_with_env(yaml, &no_env).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let yaml = r"
connections:
  x:
    system: sap
    base_url: not a url
    auth: { type: basic, username: u, password: p }
";
        let err = BridgeConfig::from_yaml_str_with_env(yaml, &no_env).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_template_covers_every_system() {
        let config = BridgeConfig::from_yaml_str_with_env(TEMPLATE, &no_env).unwrap();
        let systems: Vec<SystemKind> = config.connections.values().map(|p| p.system).collect();
        assert_eq!(config.connections.len(), 4);
        for system in SystemKind::ALL {
            assert!(systems.contains(&system), "template lacks {system}");
        }
        assert_eq!(
            config.profile("netsuite").unwrap().options.account_id.as_deref(),
            Some("1234567")
        );
    }

    #[test]
    fn test_load_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = BridgeConfig::load_file(&path, &no_env).unwrap();
        assert!(config.connections.is_empty());

        BridgeConfig::write_template(&path, false).unwrap();
        let config = BridgeConfig::load_file(&path, &no_env).unwrap();
        assert_eq!(config.profile_names().len(), 4);
    }

    #[test]
    fn test_write_template_respects_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        BridgeConfig::write_template(&path, false).unwrap();
        assert!(BridgeConfig::write_template(&path, false).is_err());

        fs::write(&path, "connections: {}\n").unwrap();
        BridgeConfig::write_template(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), TEMPLATE);
    }

    #[test]
    fn test_resolve_path_order() {
        let explicit = Path::new("/tmp/explicit.yaml");
        let env = env_from(&[(CONFIG_ENV_VAR, "/tmp/from-env.yaml")]);

        assert_eq!(
            resolve_path(Some(explicit), &env),
            Some(PathBuf::from("/tmp/explicit.yaml"))
        );
        assert_eq!(
            resolve_path(None, &env),
            Some(PathBuf::from("/tmp/from-env.yaml"))
        );
    }
}
