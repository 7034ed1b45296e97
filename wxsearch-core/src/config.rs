use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Settings stored on disk. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the geocoding API, without the `/search` path.
    pub geocoding_url: String,

    /// Base URL of the forecast API, without the `/forecast` path.
    pub forecast_url: String,

    /// Language of place names returned by geocoding.
    pub language: String,

    /// HTTP timeout per request.
    pub timeout_secs: u64,

    /// Quiet period after the last keystroke before suggestions are fetched.
    pub debounce_ms: u64,

    /// Maximum number of suggestions shown.
    pub suggestion_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1".to_string(),
            forecast_url: "https://api.open-meteo.com/v1".to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
            debounce_ms: 300,
            suggestion_limit: 5,
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.geocoding_url.trim().is_empty() {
            bail!("geocoding_url must not be empty");
        }
        if self.forecast_url.trim().is_empty() {
            bail!("forecast_url must not be empty");
        }
        if self.suggestion_limit == 0 {
            bail!("suggestion_limit must be at least 1");
        }
        Ok(())
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg = Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wxsearch", "wxsearch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();

        assert_eq!(cfg.geocoding_url, "https://geocoding-api.open-meteo.com/v1");
        assert_eq!(cfg.forecast_url, "https://api.open-meteo.com/v1");
        assert_eq!(cfg.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.suggestion_limit, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg = Config::from_toml("debounce_ms = 150\n").expect("partial config must parse");

        assert_eq!(cfg.debounce_ms, 150);
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = Config { language: "de".into(), suggestion_limit: 3, ..Config::default() };

        let text = cfg.to_toml().expect("serialize");
        let parsed = Config::from_toml(&text).expect("parse");

        assert_eq!(parsed, cfg);
    }

    #[test]
    fn zero_suggestion_limit_is_rejected() {
        let err = Config::from_toml("suggestion_limit = 0\n").unwrap_err();
        assert!(err.to_string().contains("suggestion_limit"));
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = Config::from_toml("forecast_url = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("forecast_url"));
    }
}
