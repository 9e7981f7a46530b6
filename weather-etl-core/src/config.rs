use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::EtlError;

pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";
pub const DEFAULT_TABLE: &str = "weather_data";

pub const ENV_OPENWEATHER_API_KEY: &str = "OPENWEATHERMAP_API_KEY";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";

/// Credentials and endpoint of the weather provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_OPENWEATHER_BASE_URL.to_string()
}

const fn default_timeout() -> u64 {
    30
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: default_base_url(), timeout_secs: default_timeout() }
    }
}

impl OpenWeatherConfig {
    /// The configured key, treating an empty string as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Connection settings of the hosted store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub key: Option<String>,

    /// Example TOML:
    /// [supabase]
    /// table = "weather_data"
    #[serde(default)]
    pub table: Option<String>,
}

impl SupabaseConfig {
    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or(DEFAULT_TABLE)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub openweather: OpenWeatherConfig,

    #[serde(default)]
    pub supabase: SupabaseConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self, EtlError> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            EtlError::Configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml(&contents).map_err(|e| {
            EtlError::Configuration(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, EtlError> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EtlError::Configuration(format!(
                    "Failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let toml = toml::to_string_pretty(self).map_err(|e| {
            EtlError::Configuration(format!("Failed to serialize configuration to TOML: {e}"))
        })?;

        fs::write(&path, toml).map_err(|e| {
            EtlError::Configuration(format!("Failed to write config file {}: {e}", path.display()))
        })?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, EtlError> {
        let dirs = ProjectDirs::from("dev", "weather-etl", "weather-etl").ok_or_else(|| {
            EtlError::Configuration("Could not determine platform config directory".to_string())
        })?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay secrets from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay secrets from an arbitrary lookup; empty values are ignored.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_OPENWEATHER_API_KEY) {
            self.openweather.api_key = Some(key);
        }
        if let Some(url) = get(ENV_SUPABASE_URL) {
            self.supabase.url = Some(url);
        }
        if let Some(key) = get(ENV_SUPABASE_KEY) {
            self.supabase.key = Some(key);
        }

        self
    }

    pub fn set_openweather_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    pub fn set_supabase_credentials(&mut self, url: String, key: String) {
        self.supabase.url = Some(url);
        self.supabase.key = Some(key);
    }

    pub fn is_openweather_configured(&self) -> bool {
        self.openweather.api_key().is_some()
    }

    pub fn is_supabase_configured(&self) -> bool {
        self.supabase.url.is_some() && self.supabase.key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_public_endpoints() {
        let cfg = Config::default();

        assert_eq!(cfg.openweather.base_url, DEFAULT_OPENWEATHER_BASE_URL);
        assert_eq!(cfg.openweather.timeout_secs, 30);
        assert_eq!(cfg.supabase.table(), "weather_data");
        assert!(!cfg.is_openweather_configured());
        assert!(!cfg.is_supabase_configured());
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = Config::from_toml(
            r#"
            [openweather]
            api_key = "FILE_KEY"

            [supabase]
            url = "https://example.supabase.co"
            table = "forecasts"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.openweather.api_key(), Some("FILE_KEY"));
        assert_eq!(cfg.openweather.base_url, DEFAULT_OPENWEATHER_BASE_URL);
        assert_eq!(cfg.supabase.table(), "forecasts");
        assert!(!cfg.is_supabase_configured());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key("FILE_KEY".into());

        let cfg = cfg.apply_env_from(lookup(&[
            (ENV_OPENWEATHER_API_KEY, "ENV_KEY"),
            (ENV_SUPABASE_URL, "https://env.supabase.co"),
            (ENV_SUPABASE_KEY, "SB_KEY"),
        ]));

        assert_eq!(cfg.openweather.api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.supabase.url.as_deref(), Some("https://env.supabase.co"));
        assert!(cfg.is_supabase_configured());
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key("FILE_KEY".into());

        let cfg = cfg.apply_env_from(lookup(&[(ENV_OPENWEATHER_API_KEY, "  ")]));

        assert_eq!(cfg.openweather.api_key(), Some("FILE_KEY"));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key(String::new());

        assert!(!cfg.is_openweather_configured());
    }

    #[test]
    fn toml_roundtrip_keeps_credentials() {
        let mut cfg = Config::default();
        cfg.set_supabase_credentials("https://x.supabase.co".into(), "KEY".into());

        let text = toml::to_string_pretty(&cfg).expect("serializable");
        let back = Config::from_toml(&text).expect("parsable");

        assert_eq!(back.supabase.key.as_deref(), Some("KEY"));
        assert_eq!(back.openweather.timeout_secs, 30);
    }
}
