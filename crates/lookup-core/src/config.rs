//! Configuration management for Lookup.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/lookup/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bypass-proxy settings
    pub proxy: ProxyConfig,
    /// Orchestration settings
    pub search: SearchConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_path = config_path.into();

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LOOKUP_PROXY_URL`: Override the bypass-proxy endpoint
    /// - `LOOKUP_PROXY_MAX_TIMEOUT_MS`: Override the per-fetch challenge timeout
    /// - `LOOKUP_HEADLESS`: Override browser headless mode (true/false)
    /// - `LOOKUP_BACKEND_TIMEOUT_SECS`: Override the per-backend timeout
    /// - `LOOKUP_SOURCES_DIR`: Override the source definitions directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("LOOKUP_PROXY_URL") {
            tracing::debug!("Override proxy.endpoint from env: {}", val);
            self.proxy.endpoint = val;
        }

        if let Some(val) = var("LOOKUP_PROXY_MAX_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.proxy.max_timeout_ms = ms;
                tracing::debug!("Override proxy.max_timeout_ms from env: {}", ms);
            }
        }

        if let Some(val) = var("LOOKUP_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = var("LOOKUP_BACKEND_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.search.backend_timeout_secs = secs;
                tracing::debug!("Override search.backend_timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = var("LOOKUP_SOURCES_DIR") {
            tracing::debug!("Override search.sources_dir from env: {}", val);
            self.search.sources_dir = Some(PathBuf::from(val));
        }
    }

    /// Check values that would otherwise fail late at request time.
    pub fn validate(&self) -> ConfigResult<()> {
        let endpoint = &self.proxy.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "proxy.endpoint".to_string(),
                reason: format!("must be an http(s) URL, got '{endpoint}'"),
            });
        }

        if self.proxy.max_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "proxy.max_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.search.backend_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.backend_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/lookup/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "lookup", "lookup").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Bypass-proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Full URL of the proxy's command endpoint
    pub endpoint: String,
    /// `maxTimeout` sent with every fetch, in milliseconds
    pub max_timeout_ms: u64,
    /// Extra HTTP time allowed on top of `max_timeout_ms`, in seconds
    pub request_grace_secs: u64,
}

impl ProxyConfig {
    /// Default fetch timeout as a `Duration`.
    #[must_use]
    pub fn max_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8191/v1".to_string(),
            max_timeout_ms: 60_000,
            request_grace_secs: 15,
        }
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Time after which a backend is abandoned for the current query
    pub backend_timeout_secs: u64,
    /// Directory holding source definitions (defaults to `source-definitions/`)
    pub sources_dir: Option<PathBuf>,
}

impl SearchConfig {
    /// Per-backend timeout as a `Duration`.
    #[must_use]
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend_timeout_secs: 120,
            sources_dir: None,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Bounded wait for result elements, in seconds
    pub wait_timeout_secs: u64,
    /// Explicit Chrome/Chromium binary
    pub chrome_executable: Option<PathBuf>,
}

impl BrowserConfig {
    /// Bounded UI wait as a `Duration`.
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            wait_timeout_secs: 10,
            chrome_executable: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.proxy.endpoint, "http://localhost:8191/v1");
        assert_eq!(config.proxy.max_timeout_ms, 60_000);
        assert_eq!(config.proxy.max_timeout(), Duration::from_secs(60));
        assert_eq!(config.search.backend_timeout_secs, 120);
        assert_eq!(config.browser.wait_timeout_secs, 10);
        assert!(config.browser.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[proxy]"));
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[browser]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.proxy.endpoint, config.proxy.endpoint);
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.proxy.endpoint = "http://solver.internal:8191/v1".to_string();
        config.search.backend_timeout_secs = 45;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.proxy.endpoint, "http://solver.internal:8191/v1");
        assert_eq!(loaded.search.backend_timeout_secs, 45);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded = AppConfig::load_from(tmp.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.proxy.max_timeout_ms, 60_000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LOOKUP_PROXY_URL", "http://10.0.0.5:8191/v1"),
            ("LOOKUP_PROXY_MAX_TIMEOUT_MS", "30000"),
            ("LOOKUP_HEADLESS", "false"),
            ("LOOKUP_BACKEND_TIMEOUT_SECS", "not-a-number"),
            ("LOOKUP_SOURCES_DIR", "/etc/lookup/sources"),
        ]);

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.proxy.endpoint, "http://10.0.0.5:8191/v1");
        assert_eq!(config.proxy.max_timeout_ms, 30_000);
        assert!(!config.browser.headless);
        // Unparseable values leave the default in place
        assert_eq!(config.search.backend_timeout_secs, 120);
        assert_eq!(
            config.search.sources_dir,
            Some(PathBuf::from("/etc/lookup/sources"))
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[proxy]
endpoint = "http://proxy:8191/v1"

[browser]
headless = false
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.proxy.endpoint, "http://proxy:8191/v1");
        assert!(!config.browser.headless);
        // These should be defaults
        assert_eq!(config.proxy.max_timeout_ms, 60_000);
        assert_eq!(config.search.backend_timeout_secs, 120);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.proxy.endpoint = "localhost:8191".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "proxy.endpoint"
        ));

        let mut config = AppConfig::default();
        config.search.backend_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
