//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use snack_policy::{AllowList, DEFAULT_PROVIDER};
use snack_watchdog::{WatchdogConfig, POLL_INTERVAL_MS};

use crate::error::CoreError;
use crate::Result;

pub const DEFAULT_URL: &str = "https://expo.dev/accounts/flylegion/snacks";

/// Mobile Chrome user agent; the editor serves its touch layout to it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; Mobile) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Mobile Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root for everything the shell keeps on disk
    pub data_dir: PathBuf,
    /// Path to the database file
    pub database_path: PathBuf,
    /// Location for new tabs and for the first launch
    pub default_url: String,
    /// Hosting platform domain the allow-list is derived from
    pub provider_domain: String,
    /// Explicit allow-list; derived from `provider_domain` when empty
    pub allowed_domains: Vec<String>,
    /// User agent sent by every tab
    pub user_agent: String,
    /// Liveness protocol parameters
    pub watchdog: WatchdogConfig,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("snack-shell.db"),
            data_dir,
            default_url: DEFAULT_URL.to_string(),
            provider_domain: DEFAULT_PROVIDER.to_string(),
            allowed_domains: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            watchdog: WatchdogConfig::default(),
        }
    }

    /// Per-user local data directory, falling back to `.snack-shell`
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("SnackShell"))
            .unwrap_or_else(|| PathBuf::from(".snack-shell"))
    }

    /// Defaults overlaid with `<data_dir>/config.json` when it exists. A file
    /// that cannot be read or parsed is logged and ignored.
    pub fn load() -> Self {
        let data_dir = Self::default_data_dir();
        let path = data_dir.join("config.json");

        if !path.exists() {
            return Self::new(data_dir);
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid configuration");
                Self::new(data_dir)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.default_url).is_err() {
            return Err(CoreError::Config(format!(
                "default_url is not a valid URL: {}",
                self.default_url
            )));
        }

        if self.allowed_domains.is_empty() && self.provider_domain.trim().is_empty() {
            return Err(CoreError::Config(
                "provider_domain or allowed_domains must be set".to_string(),
            ));
        }

        if self.watchdog.poll_interval_ms != POLL_INTERVAL_MS {
            return Err(CoreError::Config(format!(
                "watchdog.poll_interval_ms is fixed at {} ms",
                POLL_INTERVAL_MS
            )));
        }

        Ok(())
    }

    /// Browsing profile shared by every tab's webview
    pub fn webview_data_dir(&self) -> PathBuf {
        self.data_dir.join("webview")
    }

    pub fn allow_list(&self) -> AllowList {
        if self.allowed_domains.is_empty() {
            AllowList::for_provider(&self.provider_domain)
        } else {
            AllowList::from_domains(&self.allowed_domains)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("/tmp/snack"));

        assert_eq!(config.database_path, PathBuf::from("/tmp/snack/snack-shell.db"));
        assert_eq!(config.webview_data_dir(), PathBuf::from("/tmp/snack/webview"));
        assert_eq!(config.default_url, DEFAULT_URL);
        assert_eq!(config.watchdog.poll_interval_ms, 4000);
        assert!(config.validate().is_ok());

        let list = config.allow_list();
        assert_eq!(list.len(), 5);
        assert!(list.is_allowed("https://snack.expo.dev/x"));
    }

    #[test]
    fn test_explicit_allowed_domains_win() {
        let mut config = Config::new(PathBuf::from("/tmp/snack"));
        config.allowed_domains = vec!["example.org".to_string()];

        let list = config.allow_list();
        assert!(list.is_allowed("https://docs.example.org/"));
        assert!(!list.is_allowed("https://expo.dev/"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = std::env::temp_dir().join(format!("snack-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "default_url": "https://snack.expo.dev/" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_url, "https://snack.expo.dev/");
        assert_eq!(config.provider_domain, "expo.dev");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_default_data_dir_is_shared_root() {
        let config = Config::default();

        assert_eq!(config.data_dir, Config::default_data_dir());
        assert!(config.database_path.starts_with(&config.data_dir));
        assert!(config.webview_data_dir().starts_with(&config.data_dir));
        if let Some(local) = dirs::data_local_dir() {
            assert_eq!(config.data_dir, local.join("SnackShell"));
        }
    }

    #[test]
    fn test_invalid_default_url_rejected() {
        let mut config = Config::new(PathBuf::from("/tmp/snack"));
        config.default_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_poll_interval_is_fixed() {
        let mut config = Config::new(PathBuf::from("/tmp/snack"));
        config.watchdog.marker_object = "AppRuntime".to_string();
        assert!(config.validate().is_ok());

        config.watchdog.poll_interval_ms = 1000;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
