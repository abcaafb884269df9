//! Configuration management for Brandpost.
//!
//! Handles loading and saving configuration from TOML files, with a small
//! set of environment overrides for the content service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::profile::{FileProfileSource, ProfileSource, ProfileTemplate, StaticProfileSource};

/// Environment variable overriding `service.base_url`.
pub const ENV_SERVICE_URL: &str = "BRANDPOST_SERVICE_URL";

/// Environment variable overriding `service.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "BRANDPOST_TIMEOUT_SECS";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote content service settings
    pub service: ServiceConfig,

    /// Schedule validation settings
    pub schedule: ScheduleConfig,

    /// Identity provider settings
    pub identity: IdentityConfig,

    /// Profile source settings
    pub profile: ProfileConfig,

    /// UI/TUI settings
    pub ui: UiConfig,
}

/// Remote content service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the content service
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Schedule validation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Reject schedule times that are not in the future
    pub require_future: bool,
}

/// Identity provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Usernames allowed to log in (empty allows anyone)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_users: Vec<String>,
}

/// Profile source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Directory holding per-user `<user>.toml` profiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<String>,

    /// Attributes used when no per-user profile exists
    #[serde(flatten)]
    pub defaults: ProfileTemplate,
}

/// UI/TUI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme name (built-in: default, dracula, nord)
    pub theme: String,

    /// Whether to raise desktop notifications
    pub desktop_notifications: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:8000".to_string(), timeout_secs: 30 }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "default".to_string(), desktop_notifications: true }
    }
}

impl ServiceConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// Looks for config in:
    /// 1. `.brandpost.toml` in current directory
    /// 2. `~/.config/brandpost/config.toml`
    /// 3. Falls back to defaults
    ///
    /// Environment overrides are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_file_or_default()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_file_or_default() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".brandpost.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::global_config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file, then apply environment overrides.
    pub fn load_with_path(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `BRANDPOST_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(url) = std::env::var(ENV_SERVICE_URL) {
            if !url.trim().is_empty() {
                self.service.base_url = url.trim().to_string();
            }
        }

        if let Ok(secs) = std::env::var(ENV_TIMEOUT_SECS) {
            self.service.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a number of seconds", ENV_TIMEOUT_SECS))?;
        }

        Ok(())
    }

    /// Load a `.env` file from the current directory, if present.
    ///
    /// Variables already set in the environment win.
    pub fn load_env_file() -> anyhow::Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        std::fs::create_dir_all(&config_dir)?;

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_dir.join("config.toml"), content)?;

        Ok(())
    }

    /// Build the profile source described by this configuration.
    ///
    /// A profile directory takes precedence, with the inline defaults as
    /// fallback for users without a file.
    pub fn profile_source(&self) -> Box<dyn ProfileSource> {
        let defaults = StaticProfileSource::new(self.profile.defaults.clone());
        match &self.profile.profile_dir {
            Some(dir) => Box::new(FileProfileSource::new(dir).with_fallback(Box::new(defaults))),
            None => Box::new(defaults),
        }
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("brandpost"))
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UserIdentity;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert!(!config.schedule.require_future);
        assert_eq!(config.ui.theme, "default");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[service]"));
        assert!(toml_str.contains("[ui]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [service]
            base_url = "https://posts.example.com"
            timeout_secs = 5

            [schedule]
            require_future = true

            [identity]
            allowed_users = ["alice"]

            [profile]
            skills = ["rust", "distributed systems"]
            interests = ["open source"]

            [ui]
            theme = "nord"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.base_url, "https://posts.example.com");
        assert_eq!(config.service.timeout_secs, 5);
        assert!(config.schedule.require_future);
        assert_eq!(config.identity.allowed_users, vec!["alice"]);
        assert_eq!(config.profile.defaults.skills, vec!["rust", "distributed systems"]);
        assert!(config.profile.defaults.experience.is_empty());
        assert_eq!(config.ui.theme, "nord");
        assert!(config.ui.desktop_notifications);
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let service = ServiceConfig { timeout_secs: 0, ..Default::default() };
        assert_eq!(service.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_profile_source_from_inline_defaults() {
        let mut config = Config::default();
        config.profile.defaults.skills = vec!["writing".to_string()];

        let profile = config.profile_source().load(&UserIdentity::new("zoe")).unwrap();
        assert_eq!(profile.skills, vec!["writing"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[service]\nbase_url = \"http://127.0.0.1:9000\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.service.timeout_secs, 30);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_SERVICE_URL, "http://override:1234");
        std::env::set_var(ENV_TIMEOUT_SECS, "7");

        let mut config = Config::default();
        config.apply_env_overrides().unwrap();

        std::env::remove_var(ENV_SERVICE_URL);
        std::env::remove_var(ENV_TIMEOUT_SECS);

        assert_eq!(config.service.base_url, "http://override:1234");
        assert_eq!(config.service.timeout_secs, 7);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_bad_timeout() {
        std::env::set_var(ENV_TIMEOUT_SECS, "soon");

        let mut config = Config::default();
        let result = config.apply_env_overrides();

        std::env::remove_var(ENV_TIMEOUT_SECS);

        assert!(result.is_err());
    }
}
