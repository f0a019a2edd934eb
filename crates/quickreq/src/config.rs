//! Client configuration
//!
//! The process-wide client reads its settings once from a properties file
//! (`key = value` lines). Every key is optional; a missing file or any value
//! that does not parse falls back to [`ClientConfig::default`] with a single
//! warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Environment variable naming the properties file
pub const CONFIG_PATH_ENV: &str = "QUICKREQ_CONFIG";

/// Properties file looked up in the working directory when
/// [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_FILE: &str = "httpRequestConfig.properties";

/// Connection, timeout and retry settings for an [`HttpClient`](crate::HttpClient)
//
// Aliases cover sources that lowercase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Socket read timeout in milliseconds
    #[serde(rename = "socketTimeout", alias = "sockettimeout")]
    pub socket_timeout_ms: u64,
    /// Connection establishment timeout in milliseconds
    #[serde(rename = "connectTimeout", alias = "connecttimeout")]
    pub connect_timeout_ms: u64,
    /// Ceiling on concurrent connections across all routes
    #[serde(rename = "connectionMaxTotal", alias = "connectionmaxtotal")]
    pub connection_max_total: usize,
    /// Ceiling on concurrent connections to one route
    #[serde(rename = "connectionMaxPerRoute", alias = "connectionmaxperroute")]
    pub connection_max_per_route: usize,
    /// Additional attempts after a retryable transport failure
    #[serde(rename = "retryCount", alias = "retrycount")]
    pub retry_count: u32,
    /// Accept self-signed and otherwise invalid TLS certificates
    #[serde(rename = "trustSelfSigned", alias = "trustselfsigned")]
    pub trust_self_signed: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            connection_max_total: 20,
            connection_max_per_route: 2,
            retry_count: 3,
            trust_self_signed: false,
        }
    }
}

impl ClientConfig {
    /// Load from `$QUICKREQ_CONFIG`, or from [`DEFAULT_CONFIG_FILE`] in the
    /// working directory
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Load from `path`, falling back to defaults when the file is missing or
    /// invalid
    pub fn load_from(path: &Path) -> Self {
        if !path.is_file() {
            tracing::warn!(
                path = %path.display(),
                "Configuration file not found, using default client configuration"
            );
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Invalid configuration file, using default client configuration"
                );
                Self::default()
            }
        }
    }

    /// Read a properties file, failing on unreadable files or malformed values
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()?;
        config.try_deserialize()
    }

    /// Socket read timeout
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    /// Connection establishment timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
