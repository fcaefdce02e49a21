use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::Credentials;
use crate::dispatcher::STATUS_CLEAR_AFTER;
use crate::poller::MIN_INTERVAL;
use crate::ui::theme::ThemePreset;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
}

/// Where the agent's web API lives and how to authenticate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token; takes precedence over basic auth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_password: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            basic_user: None,
            basic_password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Credentials to send, if any are configured
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(token) = non_blank(&self.api_token) {
            return Some(Credentials::Token(token.to_string()));
        }
        match (non_blank(&self.basic_user), non_blank(&self.basic_password)) {
            (Some(user), Some(password)) => Some(Credentials::Basic {
                user: user.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }
}

fn hidden(secret: &Option<String>) -> Option<String> {
    secret.as_ref().map(|_| "<hidden>".to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Snapshot polling and status line timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Seconds before an action status message clears itself
    #[serde(default = "default_status_clear_secs")]
    pub status_clear_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            status_clear_secs: default_status_clear_secs(),
        }
    }
}

impl PollingConfig {
    /// Poll interval, never below the minimum
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms).max(MIN_INTERVAL)
    }

    pub fn status_clear_after(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }
}

fn default_interval_ms() -> u64 {
    2500
}

fn default_status_clear_secs() -> u64 {
    STATUS_CLEAR_AFTER.as_secs()
}

/// Last view of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// View link query string, e.g. `filter=active&prio=1`
    #[serde(default)]
    pub link: String,
}

/// Dashboard appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub theme: ThemePreset,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("com", "dropdeck", "Dropdeck")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("No configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Edit the saved configuration file in place.
    ///
    /// Works on the file contents alone, so environment and command line
    /// overrides held by a running config never reach the disk.
    pub fn update_file(path: &Path, edit: impl FnOnce(&mut Config) -> Result<()>) -> Result<()> {
        let mut config = Self::load_from(path)?;
        edit(&mut config)?;
        config.save_to(path)
    }

    /// `update_file` on the default config path
    pub fn update_saved(edit: impl FnOnce(&mut Config) -> Result<()>) -> Result<()> {
        Self::update_file(&Self::config_path()?, edit)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Override server settings from the environment. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = read("DROPDECK_URL") {
            self.server.base_url = url;
        }
        if let Some(token) = read("API_TOKEN") {
            self.server.api_token = Some(token);
        }
        if let Some(user) = read("API_BASIC_USER") {
            self.server.basic_user = Some(user);
        }
        if let Some(password) = read("API_BASIC_PASSWORD") {
            self.server.basic_password = Some(password);
        }
    }

    /// Read a value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();
        let unset = || "<not set>".to_string();

        match parts.as_slice() {
            ["server", "base_url"] => Ok(self.server.base_url.clone()),
            ["server", "api_token"] => Ok(hidden(&self.server.api_token).unwrap_or_else(unset)),
            ["server", "basic_user"] => Ok(self.server.basic_user.clone().unwrap_or_else(unset)),
            ["server", "basic_password"] => Ok(hidden(&self.server.basic_password).unwrap_or_else(unset)),
            ["server", "timeout_secs"] => Ok(self.server.timeout_secs.to_string()),
            ["polling", "interval_ms"] => Ok(self.polling.interval_ms.to_string()),
            ["polling", "status_clear_secs"] => Ok(self.polling.status_clear_secs.to_string()),
            ["view", "link"] => Ok(self.view.link.clone()),
            ["launcher", "theme"] => Ok(self.launcher.theme.name().to_string()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    /// Set a value by dotted key. An empty value clears optional fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        match parts.as_slice() {
            ["server", "base_url"] => {
                url::Url::parse(value)?;
                self.server.base_url = value.to_string();
            }
            ["server", "api_token"] => self.server.api_token = optional(value),
            ["server", "basic_user"] => self.server.basic_user = optional(value),
            ["server", "basic_password"] => self.server.basic_password = optional(value),
            ["server", "timeout_secs"] => self.server.timeout_secs = value.parse()?,
            ["polling", "interval_ms"] => self.polling.interval_ms = value.parse()?,
            ["polling", "status_clear_secs"] => self.polling.status_clear_secs = value.parse()?,
            ["view", "link"] => self.view.link = value.trim_start_matches('?').to_string(),
            ["launcher", "theme"] => {
                self.launcher.theme = ThemePreset::parse(value)
                    .ok_or_else(|| anyhow::anyhow!("Unknown theme: {}", value))?;
            }
            _ => anyhow::bail!("Unknown or read-only config key: {}", key),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.server.timeout_secs, 10);
        assert_eq!(config.polling.interval(), Duration::from_millis(2500));
        assert_eq!(config.polling.status_clear_after(), Duration::from_secs(3));
        assert!(config.server.credentials().is_none());
    }

    #[test]
    fn test_interval_floor() {
        let polling = PollingConfig {
            interval_ms: 50,
            ..Default::default()
        };
        assert_eq!(polling.interval(), MIN_INTERVAL);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[polling]\ninterval_ms = 1000\n").unwrap();
        assert_eq!(config.polling.interval_ms, 1000);
        assert_eq!(config.polling.status_clear_secs, 3);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.view.link = "filter=active&prio=1".to_string();
        config.launcher.theme = ThemePreset::Amber;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DROPDECK_URL", "http://miner.lan:9000"),
            ("API_TOKEN", "secret"),
            ("API_BASIC_USER", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.base_url, "http://miner.lan:9000");
        assert_eq!(config.server.api_token.as_deref(), Some("secret"));
        assert_eq!(config.server.basic_user, None);
    }

    #[test]
    fn test_credentials_precedence() {
        let mut server = ServerConfig {
            basic_user: Some("admin".into()),
            basic_password: Some("pw".into()),
            ..Default::default()
        };
        assert_eq!(
            server.credentials(),
            Some(Credentials::Basic {
                user: "admin".into(),
                password: "pw".into()
            })
        );

        server.api_token = Some("tok".into());
        assert_eq!(server.credentials(), Some(Credentials::Token("tok".into())));

        // Basic auth needs both halves
        let server = ServerConfig {
            basic_user: Some("admin".into()),
            ..Default::default()
        };
        assert!(server.credentials().is_none());
    }

    #[test]
    fn test_get_and_set_keys() {
        let mut config = Config::default();
        config.set("polling.interval_ms", "5000").unwrap();
        config.set("view.link", "?sort=name").unwrap();
        config.set("launcher.theme", "green").unwrap();
        config.set("server.api_token", "abc").unwrap();

        assert_eq!(config.get("polling.interval_ms").unwrap(), "5000");
        assert_eq!(config.get("view.link").unwrap(), "sort=name");
        assert_eq!(config.launcher.theme, ThemePreset::Green);
        assert_eq!(config.get("server.api_token").unwrap(), "<hidden>");

        config.set("server.api_token", "").unwrap();
        assert_eq!(config.server.api_token, None);

        assert!(config.set("server.base_url", "not a url").is_err());
        assert!(config.set("polling.interval_ms", "fast").is_err());
        assert!(config.get("nope.nothing").is_err());
    }

    #[test]
    fn test_update_file_does_not_persist_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://miner.lan:8080\"\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("DROPDECK_URL", "http://elsewhere:9000"),
            ("API_TOKEN", "s3cret-from-env"),
            ("API_BASIC_PASSWORD", "hunter2"),
        ]
        .into_iter()
        .collect();
        let mut running = Config::load_from(&path).unwrap();
        running.apply_env(|key| env.get(key).map(|v| v.to_string()));
        running.view.link = "sort=name".to_string();
        running.launcher.theme = ThemePreset::Amber;

        Config::update_file(&path, |file| {
            file.view.link = running.view.link.clone();
            file.launcher.theme = running.launcher.theme;
            Ok(())
        })
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("s3cret-from-env"));
        assert!(!written.contains("hunter2"));
        assert!(!written.contains("elsewhere"));

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.server.base_url, "http://miner.lan:8080");
        assert_eq!(saved.view.link, "sort=name");
        assert_eq!(saved.launcher.theme, ThemePreset::Amber);
    }

    #[test]
    fn test_update_file_leaves_file_alone_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::default().save_to(&path).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = Config::update_file(&path, |file| file.set("polling.interval_ms", "fast"));
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
