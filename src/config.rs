//! Server configuration
//!
//! Layering, lowest to highest precedence: built-in defaults for the binary,
//! an optional TOML file (`--config`), then environment variables (a `.env`
//! file is loaded into the environment first) and command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::mcp::dispatch::DEFAULT_MAX_BODY_BYTES;
use crate::services::elements::DEFAULT_API_BASE_URL;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const NOTES_DEFAULT_PORT: u16 = 3001;
pub const ELEMENTS_DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load .env: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
}

/// Resolved settings of one server process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub log_filter: String,
    pub api_base_url: String,
    /// Collaborator call timeout; zero disables it
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    fn with_port(port: u16) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn notes_defaults() -> Self {
        Self::with_port(NOTES_DEFAULT_PORT)
    }

    pub fn elements_defaults() -> Self {
        Self::with_port(ELEMENTS_DEFAULT_PORT)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    fn merge(&mut self, overlay: FileConfig) {
        if let Some(host) = overlay.host {
            self.host = host;
        }
        if let Some(port) = overlay.port {
            self.port = port;
        }
        if let Some(max_body_bytes) = overlay.max_body_bytes {
            self.max_body_bytes = max_body_bytes;
        }
        if let Some(log_filter) = overlay.log_filter {
            self.log_filter = log_filter;
        }
        if let Some(api_base_url) = overlay.api_base_url {
            self.api_base_url = api_base_url;
        }
        if let Some(secs) = overlay.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host",
                message: "must not be empty".to_string(),
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_body_bytes",
                message: "must be greater than zero".to_string(),
            });
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                message: format!("expected an http(s) URL, got {}", self.api_base_url),
            });
        }
        Ok(())
    }
}

/// Every setting optional, as read from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    max_body_bytes: Option<usize>,
    log_filter: Option<String>,
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Command line shared by both server binaries
#[derive(Debug, Default, Parser)]
#[command(version)]
pub struct ServerArgs {
    /// TOML file with server settings
    #[arg(long, env = "MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "MCP_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "MCP_PORT")]
    pub port: Option<u16>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "MCP_MAX_BODY_BYTES")]
    pub max_body_bytes: Option<usize>,

    /// tracing filter used when RUST_LOG is unset
    #[arg(long, env = "MCP_LOG_FILTER")]
    pub log_filter: Option<String>,

    /// Affinidi API base URL (elements server)
    #[arg(long, env = "AFFINIDI_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Affinidi API call timeout in seconds, 0 for none (elements server)
    #[arg(long, env = "MCP_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
}

impl ServerArgs {
    /// Layer the config file and these arguments over `defaults`
    pub fn resolve(self, defaults: ServerConfig) -> Result<ServerConfig, ConfigError> {
        let mut config = defaults;
        if let Some(path) = &self.config {
            config.merge(FileConfig::load(path)?);
        }
        config.merge(FileConfig {
            host: self.host,
            port: self.port,
            max_body_bytes: self.max_body_bytes,
            log_filter: self.log_filter,
            api_base_url: self.api_base_url,
            request_timeout_secs: self.request_timeout_secs,
        });
        config.validate()?;
        Ok(config)
    }
}

/// Load `.env` from the working directory or its parents. A missing file is
/// not an error.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<(), ConfigError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ConfigError::Tracing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(flags: &[&str]) -> ServerArgs {
        let mut argv = vec!["server"];
        argv.extend_from_slice(flags);
        ServerArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let notes = ServerConfig::notes_defaults();
        assert_eq!(notes.bind_addr(), "127.0.0.1:3001");
        assert_eq!(notes.max_body_bytes, 4 * 1024 * 1024);
        assert_eq!(notes.log_filter, "info");

        let elements = ServerConfig::elements_defaults();
        assert_eq!(elements.port, 3002);
        assert_eq!(elements.api_base_url, "https://apse1.api.affinidi.io");
        assert_eq!(elements.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut config = ServerConfig::elements_defaults();
        config.request_timeout_secs = 0;
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4100\nhost = \"0.0.0.0\"\nrequest_timeout_secs = 5").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = ServerArgs {
            config: Some(path.into()),
            port: Some(4200),
            ..ServerArgs::default()
        }
        .resolve(ServerConfig::elements_defaults())
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 4200);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot = 1").unwrap();

        let err = ServerArgs {
            config: Some(file.path().to_path_buf()),
            ..ServerArgs::default()
        }
        .resolve(ServerConfig::notes_defaults())
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ServerArgs {
            config: Some(PathBuf::from("/nonexistent/elements-mcp.toml")),
            ..ServerArgs::default()
        }
        .resolve(ServerConfig::notes_defaults())
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerArgs {
            max_body_bytes: Some(0),
            ..ServerArgs::default()
        }
        .resolve(ServerConfig::notes_defaults())
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_body_bytes",
                ..
            }
        ));

        let err = ServerArgs {
            api_base_url: Some("ftp://example.com".into()),
            ..ServerArgs::default()
        }
        .resolve(ServerConfig::elements_defaults())
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "api_base_url", .. }));
    }

    #[test]
    fn test_cli_flags() {
        let parsed = args(&["--port", "5000", "--api-base-url", "http://localhost:9000"]);
        assert_eq!(parsed.port, Some(5000));
        let config = parsed.resolve(ServerConfig::elements_defaults()).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.api_base_url, "http://localhost:9000");
    }
}
