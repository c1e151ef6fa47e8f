use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{model::Units, provider::openweather::DEFAULT_BASE_URL};

/// Environment variable holding the OpenWeather API key, read at runtime and
/// captured at build time.
pub const API_KEY_ENV: &str = "CITYCAST_API_KEY";

const BUILD_TIME_API_KEY: Option<&str> = option_env!("CITYCAST_API_KEY");

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    /// Override for the provider endpoint, mostly for testing against a local mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "citycast", "citycast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// API key from the config file, then the runtime environment, then the
    /// value baked in at build time.
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok(), BUILD_TIME_API_KEY)
    }

    fn resolve_api_key(&self, runtime: Option<String>, build_time: Option<&str>) -> Option<String> {
        self.api_key
            .clone()
            .into_iter()
            .chain(runtime)
            .chain(build_time.map(str::to_string))
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_key_wins() {
        let mut cfg = Config::default();
        cfg.set_api_key(" FILE_KEY ".into());

        let key = cfg.resolve_api_key(Some("ENV_KEY".into()), Some("BUILD_KEY"));
        assert_eq!(key.as_deref(), Some("FILE_KEY"));
    }

    #[test]
    fn runtime_env_key_beats_build_time_key() {
        let cfg = Config::default();

        let key = cfg.resolve_api_key(Some("ENV_KEY".into()), Some("BUILD_KEY"));
        assert_eq!(key.as_deref(), Some("ENV_KEY"));

        let key = cfg.resolve_api_key(None, Some("BUILD_KEY"));
        assert_eq!(key.as_deref(), Some("BUILD_KEY"));
    }

    #[test]
    fn blank_keys_are_skipped() {
        let cfg = Config {
            api_key: Some("   ".into()),
            ..Config::default()
        };

        assert_eq!(cfg.resolve_api_key(Some(String::new()), None), None);
        assert_eq!(
            cfg.resolve_api_key(Some(String::new()), Some("BUILD_KEY")).as_deref(),
            Some("BUILD_KEY")
        );
    }

    #[test]
    fn default_base_url_is_openweather() {
        let mut cfg = Config::default();
        assert_eq!(cfg.base_url(), "https://api.openweathermap.org");

        cfg.base_url = Some("http://127.0.0.1:9000".into());
        assert_eq!(cfg.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("defaults");

        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.units, Units::Metric);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());
        cfg.units = Units::Imperial;
        cfg.save_to(&path).expect("save");

        let contents = fs::read_to_string(&path).expect("written");
        assert!(contents.contains("units = \"imperial\""));

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.api_key.as_deref(), Some("OPEN_KEY"));
        assert_eq!(loaded.units, Units::Imperial);
        assert!(loaded.base_url.is_none());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
