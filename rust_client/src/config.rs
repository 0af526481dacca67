//! Client configuration file support.
//!
//! Settings come from a `farmmind.toml` file, then environment overrides.
//! Every section is optional; a missing file means all defaults.
//!
//! ```toml
//! [backend]
//! type = "http"
//!
//! [api]
//! base_url = "http://localhost:8080"
//! timeout_secs = 30
//!
//! [storage]
//! dir = ".farmmind"
//!
//! [estimator.cost_per_ha]
//! seeds = 50.0
//! fertilizer = 120.0
//! labor = 200.0
//!
//! [weather]
//! default_location = "Tashkent"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{ApiError, ApiResult, BackendType};
use crate::estimator::CostRates;

/// Selects the backend implementation.
pub const ENV_BACKEND: &str = "FARMMIND_BACKEND";
/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "FARMMIND_API_URL";
/// Overrides `storage.dir`.
pub const ENV_STORAGE_DIR: &str = "FARMMIND_STORAGE_DIR";

/// File name looked up by [`ClientConfig::from_default_location`].
pub const CONFIG_FILE_NAME: &str = "farmmind.toml";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub estimator: EstimatorSettings,
    #[serde(default)]
    pub weather: WeatherSettings,
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(rename = "type", default = "default_backend_type")]
    pub backend_type: String,
}

/// REST API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout; absent means requests never time out.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Where the session record and language preference live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSettings {
    #[serde(default)]
    pub cost_per_ha: CostRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_location")]
    pub default_location: String,
}

fn default_backend_type() -> String {
    "http".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".farmmind")
}

fn default_location() -> String {
    "Tashkent".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            backend_type: default_backend_type(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            default_location: default_location(),
        }
    }
}

impl ClientConfig {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> ApiResult<Self> {
        toml::from_str(content).map_err(|e| {
            ApiError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ClientConfig)` if successful
    /// * `Err(ApiError::Configuration)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> ApiResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ApiError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `farmmind.toml` in:
    /// 1. Current directory
    /// 2. `rust_client/` directory
    /// 3. Parent directory
    ///
    /// Falls back to the defaults when none of them exists.
    pub fn from_default_location() -> ApiResult<Self> {
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("rust_client").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in &search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration");
                return Self::from_file(path);
            }
        }

        tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self::default())
    }

    /// Full load sequence: explicit file or default search, then environment
    /// overrides, then validation.
    pub fn load(path: Option<&Path>) -> ApiResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_location()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `FARMMIND_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend.backend_type = backend;
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage.dir = PathBuf::from(dir);
        }
    }

    /// Get the backend type from configuration.
    pub fn backend_type(&self) -> ApiResult<BackendType> {
        self.backend.backend_type.parse().map_err(|e: String| {
            ApiError::configuration(format!("Invalid backend type: {}", e))
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> ApiResult<()> {
        if self.backend_type()? == BackendType::Http && self.api.base_url.trim().is_empty() {
            return Err(ApiError::configuration(
                "HTTP backend requires 'api.base_url' setting",
            ));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ApiError::configuration(
                "'api.timeout_secs' must be positive; omit it to disable the timeout",
            ));
        }
        let rates = &self.estimator.cost_per_ha;
        for (name, rate) in [
            ("seeds", rates.seeds),
            ("fertilizer", rates.fertilizer),
            ("labor", rates.labor),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ApiError::configuration(format!(
                    "'estimator.cost_per_ha.{}' must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.weather.default_location, "Tashkent");
        assert_eq!(config.estimator.cost_per_ha, CostRates::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::parse(
            r#"
            [backend]
            type = "local"

            [api]
            timeout_secs = 5

            [estimator.cost_per_ha]
            seeds = 70.0
            "#,
        )
        .unwrap();

        assert_eq!(config.backend_type().unwrap(), BackendType::Local);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.estimator.cost_per_ha.seeds, 70.0);
        assert_eq!(config.estimator.cost_per_ha.fertilizer, 120.0);
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some("http://farm.example:9000".to_string()),
            ENV_BACKEND => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://farm.example:9000");
        assert_eq!(config.backend.backend_type, "http");
    }

    #[test]
    fn test_validation() {
        let mut config = ClientConfig::default();
        assert!(config.validate().is_ok());

        config.api.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        config.api.timeout_secs = None;
        config.estimator.cost_per_ha.labor = -1.0;
        assert!(config.validate().is_err());

        config.estimator.cost_per_ha.labor = 200.0;
        config.backend.backend_type = "carrier-pigeon".to_string();
        assert!(matches!(
            config.validate(),
            Err(ApiError::Configuration { .. })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(ClientConfig::parse("[api\nbase_url = 3").is_err());
    }
}
