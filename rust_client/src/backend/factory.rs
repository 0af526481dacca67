//! Backend factory for dependency injection.
//!
//! Builds the shared backend instance from runtime configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::clients::{HttpBackend, LocalBackend};
use super::error::ApiResult;
use super::traits::FullBackend;
use crate::config::{ClientConfig, ENV_BACKEND};

/// Backend type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// The REST API server (production)
    Http,
    /// In-memory emulation
    Local,
}

impl FromStr for BackendType {
    type Err = String;

    /// Parse backend type from string.
    ///
    /// Accepts "http" or "remote" for the server and "local" or "memory" for
    /// the in-memory emulation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" | "remote" => Ok(Self::Http),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown backend type: {}", s)),
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Local => f.write_str("local"),
        }
    }
}

impl BackendType {
    /// Get backend type from environment variable.
    ///
    /// Reads `FARMMIND_BACKEND`. Defaults to Http if not set or invalid.
    pub fn from_env() -> Self {
        std::env::var(ENV_BACKEND)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::Http)
    }
}

/// Backend factory for creating backend instances.
///
/// # Example
/// ```no_run
/// use farmmind_lite::backend::BackendFactory;
/// use farmmind_lite::config::ClientConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::load(None)?;
/// let backend = BackendFactory::create(&config)?;
/// # Ok(())
/// # }
/// ```
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend instance from configuration.
    ///
    /// # Arguments
    /// * `config` - Loaded client configuration
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullBackend>)` - Shared backend instance
    /// * `Err(ApiError::Configuration)` - If the backend type or URL is invalid
    pub fn create(config: &ClientConfig) -> ApiResult<Arc<dyn FullBackend>> {
        match config.backend_type()? {
            BackendType::Http => {
                let http = Self::create_http(&config.api.base_url, config.timeout())?;
                Ok(http as Arc<dyn FullBackend>)
            }
            BackendType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a REST backend.
    pub fn create_http(base_url: &str, timeout: Option<Duration>) -> ApiResult<Arc<HttpBackend>> {
        tracing::debug!(base_url, ?timeout, "Creating HTTP backend");
        Ok(Arc::new(HttpBackend::with_timeout(base_url, timeout)?))
    }

    /// Create an in-memory backend.
    pub fn create_local() -> Arc<dyn FullBackend> {
        tracing::debug!("Creating local backend");
        Arc::new(LocalBackend::new())
    }
}
