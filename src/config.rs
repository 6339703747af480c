//! Configuration file parser for ~/.config/linkpage/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
//! Environment variables override the file; CLI flags override both.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::content::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::util::{validate_endpoint, UrlValidationError};

/// Fallback edit password when neither the file nor the environment sets one.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const ENV_ENDPOINT: &str = "LINKPAGE_ENDPOINT";
pub const ENV_ADMIN_PASSWORD: &str = "LINKPAGE_ADMIN_PASSWORD";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] UrlValidationError),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks the password and API key.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet web endpoint. Empty means local-only mode.
    pub endpoint_url: String,

    /// Shared secret that unlocks edit mode.
    pub admin_password: Option<String>,

    /// Quiet period before a profile text edit is written.
    pub debounce_ms: u64,

    /// Per-request timeout for the endpoint.
    pub request_timeout_secs: u64,

    pub bio: BioConfig,
}

/// `[bio]` table: the optional bio generator.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct BioConfig {
    pub enabled: bool,
    /// Alternative to the GEMINI_API_KEY env var, which takes precedence.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            admin_password: None,
            debounce_ms: 1000,
            request_timeout_secs: 20,
            bio: BioConfig::default(),
        }
    }
}

impl Default for BioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint_url", &self.endpoint_url)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("debounce_ms", &self.debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("bio", &self.bio)
            .finish()
    }
}

impl std::fmt::Debug for BioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BioConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 5] = [
    "endpoint_url",
    "admin_password",
    "debounce_ms",
    "request_timeout_secs",
    "bio",
];

const KNOWN_BIO_KEYS: [&str; 4] = ["enabled", "api_key", "model", "base_url"];

/// Unknown keys at the top level or inside `[bio]`.
fn unknown_keys(raw: &toml::Table) -> Vec<String> {
    let mut unknown: Vec<String> = raw
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();

    if let Some(bio) = raw.get("bio").and_then(toml::Value::as_table) {
        unknown.extend(
            bio.keys()
                .filter(|key| !KNOWN_BIO_KEYS.contains(&key.as_str()))
                .map(|key| format!("bio.{}", key)),
        );
    }

    unknown
}

fn warn_unknown_keys(raw: &toml::Table) {
    for key in unknown_keys(raw) {
        tracing::warn!(key = %key, "Unknown key in config file, ignoring");
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Size is checked before reading so a huge or corrupt file is never
        // pulled into memory
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between the metadata call and the read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Typos would otherwise be silently replaced by defaults
        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw);
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            configured = !config.endpoint_url.trim().is_empty(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Layer environment overrides on top, using `lookup` to read variables.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.endpoint_url = endpoint;
        }
        if let Some(password) = get(ENV_ADMIN_PASSWORD) {
            self.admin_password = Some(password);
        }
        if let Some(key) = get(ENV_GEMINI_API_KEY) {
            self.bio.api_key = Some(key);
        }
    }

    /// The validated endpoint, or `None` in local-only mode.
    pub fn endpoint(&self) -> Result<Option<Url>, ConfigError> {
        let raw = self.endpoint_url.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(validate_endpoint(raw)?))
    }

    pub fn admin_password(&self) -> SecretString {
        SecretString::from(
            self.admin_password
                .clone()
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
        )
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// API key for the bio generator, if the feature is switched on and a key exists.
    pub fn bio_api_key(&self) -> Option<SecretString> {
        if !self.bio.enabled {
            return None;
        }
        match self.bio.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Some(SecretString::from(key.to_string())),
            _ => {
                tracing::warn!("Bio generator enabled but no API key set, leaving it off");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn write_config(name: &str, content: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("linkpage_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.endpoint_url.is_empty());
        assert_eq!(config.debounce(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.admin_password().expose_secret(), DEFAULT_ADMIN_PASSWORD);
        assert!(!config.bio.enabled);
        assert_eq!(config.bio.model, DEFAULT_MODEL);
        assert!(config.endpoint().unwrap().is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/linkpage_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.debounce_ms, 1000);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert!(config.endpoint_url.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let (dir, path) = write_config(
            "full",
            r#"
endpoint_url = "https://script.google.com/macros/s/abc/exec"
admin_password = "hunter2"
debounce_ms = 250
request_timeout_secs = 5

[bio]
enabled = true
api_key = "gem-key"
model = "gemini-pro"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.endpoint().unwrap().unwrap().as_str(),
            "https://script.google.com/macros/s/abc/exec"
        );
        assert_eq!(config.admin_password().expose_secret(), "hunter2");
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.bio.model, "gemini-pro");
        assert_eq!(config.bio.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.bio_api_key().map(|k| k.expose_secret().to_string()).as_deref(),
            Some("gem-key")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "debounce_ms = 10\nsheet_id = \"x\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.debounce_ms, 10);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_insecure_endpoint_rejected() {
        let config = Config {
            endpoint_url: "http://script.example.com/exec".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.endpoint(),
            Err(ConfigError::InvalidEndpoint(UrlValidationError::Insecure))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ENDPOINT, "https://override.example.com/exec"),
            (ENV_ADMIN_PASSWORD, "from-env"),
            (ENV_GEMINI_API_KEY, ""),
        ]);
        let mut config = Config {
            endpoint_url: "https://file.example.com/exec".to_string(),
            ..Config::default()
        };
        config.bio.api_key = Some("file-key".to_string());

        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.endpoint_url, "https://override.example.com/exec");
        assert_eq!(config.admin_password().expose_secret(), "from-env");
        // Empty env values do not clobber the file
        assert_eq!(config.bio.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_bio_requires_enable_and_key() {
        let mut config = Config::default();
        config.bio.api_key = Some("k".to_string());
        assert!(config.bio_api_key().is_none());

        config.bio.enabled = true;
        assert!(config.bio_api_key().is_some());

        config.bio.api_key = Some("  ".to_string());
        assert!(config.bio_api_key().is_none());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let mut config = Config {
            admin_password: Some("super-secret-pass".to_string()),
            ..Config::default()
        };
        config.bio.api_key = Some("super-secret-key".to_string());

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-pass"));
        assert!(!debug_output.contains("super-secret-key"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_unknown_keys_include_bio_table() {
        let raw: toml::Table = r#"
            endpoint = "typo"
            debounce_ms = 500
            [bio]
            enabled = true
            apikey = "typo"
        "#
        .parse()
        .unwrap();

        assert_eq!(unknown_keys(&raw), vec!["endpoint", "bio.apikey"]);
    }
}
