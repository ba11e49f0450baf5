use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::ProviderId;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

pub const BACKEND_URL_ENV: &str = "WEATHERBOX_BACKEND_URL";
pub const BIND_ADDRESS_ENV: &str = "WEATHERBOX_BIND_ADDRESS";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
///
/// Environment overrides live in a separate layer that is never written back,
/// so `save` only persists what came from the file or an explicit upsert.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL the client uses to reach the proxy endpoints.
    pub backend_url: Option<String>,

    /// Address the proxy listens on.
    pub bind_address: Option<String>,

    /// Example TOML:
    /// [providers.tomorrowio]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(skip)]
    env: EnvOverrides,
}

#[derive(Debug, Clone, Default)]
struct EnvOverrides {
    api_keys: HashMap<ProviderId, String>,
    backend_url: Option<String>,
    bind_address: Option<String>,
}

impl Config {
    /// Load config from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories as needed.
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
        let dirs = ProjectDirs::from("dev", "weatherbox", "weatherbox")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Secrets and endpoints injected through the environment win over the file.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        for id in ProviderId::all() {
            if let Some(key) = lookup(id.env_var()) {
                self.env.api_keys.insert(*id, key);
            }
        }

        self.env.backend_url = lookup(BACKEND_URL_ENV);
        self.env.bind_address = lookup(BIND_ADDRESS_ENV);
    }

    /// Set or replace a provider API key.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present. The environment wins.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.env
            .api_keys
            .get(&provider_id)
            .map(String::as_str)
            .or_else(|| self.providers.get(provider_id.as_str()).map(|cfg| cfg.api_key.as_str()))
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    pub fn backend_url(&self) -> &str {
        self.env
            .backend_url
            .as_deref()
            .or(self.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn bind_address(&self) -> &str {
        self.env
            .bind_address
            .as_deref()
            .or(self.bind_address.as_deref())
            .unwrap_or(DEFAULT_BIND_ADDRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn set_api_key_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::TomorrowIo, "WEATHER_KEY".into());

        assert_eq!(cfg.provider_api_key(ProviderId::TomorrowIo), Some("WEATHER_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::TomorrowIo));
        assert!(!cfg.is_provider_configured(ProviderId::Mapbox));
    }

    #[test]
    fn upsert_replaces_existing_key() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::Mapbox, "OLD".into());
        cfg.upsert_provider_api_key(ProviderId::Mapbox, "NEW".into());

        assert_eq!(cfg.provider_api_key(ProviderId::Mapbox), Some("NEW"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::default();
        assert_eq!(cfg.backend_url(), DEFAULT_BACKEND_URL);
        assert_eq!(cfg.bind_address(), DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::TomorrowIo, "FROM_FILE".into());
        cfg.backend_url = Some("http://file".into());

        cfg.apply_env_overrides(|name| match name {
            "TOMORROWIO_API_KEY" => Some("FROM_ENV".into()),
            "MAPBOX_API_KEY" => Some("   ".into()),
            "WEATHERBOX_BACKEND_URL" => Some("http://env".into()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::TomorrowIo), Some("FROM_ENV"));
        assert!(!cfg.is_provider_configured(ProviderId::Mapbox));
        assert_eq!(cfg.backend_url(), "http://env");
        assert_eq!(cfg.bind_address(), DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn save_and_load_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Mapbox, "MAP_KEY".into());
        cfg.bind_address = Some("0.0.0.0:9000".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider_api_key(ProviderId::Mapbox), Some("MAP_KEY"));
        assert_eq!(loaded.bind_address(), "0.0.0.0:9000");
        assert_eq!(loaded.backend_url(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn save_never_writes_environment_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::load_from(&path).unwrap();
        cfg.apply_env_overrides(|name| match name {
            "TOMORROWIO_API_KEY" => Some("SECRET_FROM_ENV".into()),
            "WEATHERBOX_BACKEND_URL" => Some("http://env".into()),
            _ => None,
        });
        cfg.upsert_provider_api_key(ProviderId::Mapbox, "MAP_KEY".into());
        cfg.save_to(&path).unwrap();

        assert_eq!(cfg.provider_api_key(ProviderId::TomorrowIo), Some("SECRET_FROM_ENV"));

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("SECRET_FROM_ENV"));
        assert!(!on_disk.contains("http://env"));
        assert!(on_disk.contains("MAP_KEY"));

        let reloaded = Config::load_from(&path).unwrap();
        assert!(!reloaded.is_provider_configured(ProviderId::TomorrowIo));
        assert_eq!(reloaded.backend_url(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn load_from_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "providers = 3").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
