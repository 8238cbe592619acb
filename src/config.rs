//! Configuration for the Key Administrator client.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `keyadmin.toml` file, or an explicitly given file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `KEYADMIN_HOST` - Gateway host name
//! - `KEYADMIN_PORT` - Gateway port (default 7050)
//! - `KEYADMIN_PATH` - Request path on the gateway (default `/`)
//! - `KEYADMIN_USERNAME` - Reseller login
//! - `KEYADMIN_PASSWORD` - Reseller password
//! - `KEYADMIN_TIMEOUT_MS` - Per-call timeout in milliseconds
//! - `KEYADMIN_VERIFY_TLS` - Verify the gateway's TLS certificate
//! - `KEYADMIN_USE_TLS` - Connect over HTTPS
//! - `KEYADMIN_DEBUG` - Trace request and response bodies
//! - `KEYADMIN_LOGGING_ENABLED` - Install the log subscriber
//! - `KEYADMIN_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use serde::Deserialize;

use crate::credential::{Credential, ANONYMOUS_LOGIN};
use crate::errors::{KeyAdminError, KeyAdminResult};

/// Port the gateway listens on.
pub const DEFAULT_PORT: u16 = 7050;

/// Suggested network timeout for gateway calls, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 900_000;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "keyadmin";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyAdminConfig {
    /// Gateway connection configuration
    pub portal: PortalConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Gateway connection configuration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Host name of the gateway
    pub host: String,
    /// Port of the XML-RPC service
    pub port: u16,
    /// Request path
    pub path: String,
    /// Reseller login
    pub username: String,
    /// Reseller password
    pub password: String,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
    /// Verify the server certificate
    pub verify_tls: bool,
    /// Connect over HTTPS
    pub use_tls: bool,
    /// Trace request and response bodies
    pub debug: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            path: "/".to_string(),
            username: ANONYMOUS_LOGIN.to_string(),
            password: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verify_tls: true,
            use_tls: true,
            debug: false,
        }
    }
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("path", &self.path)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("verify_tls", &self.verify_tls)
            .field("use_tls", &self.use_tls)
            .field("debug", &self.debug)
            .finish()
    }
}

impl PortalConfig {
    /// Defaults for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Skip certificate verification.
    pub fn insecure(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn credential(&self) -> Credential {
        Credential::new(self.username.clone(), self.password.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL of the XML-RPC endpoint.
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{scheme}://{}:{}{path}", self.host, self.port)
    }

    /// Validate the connection settings.
    pub fn validate(&self) -> KeyAdminResult<()> {
        if self.host.trim().is_empty() {
            return Err(KeyAdminError::InvalidConfig(
                "portal.host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(KeyAdminError::InvalidConfig(
                "portal.port must be greater than 0".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(KeyAdminError::InvalidConfig(
                "portal.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Install a log subscriber
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> KeyAdminResult<()> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(KeyAdminError::InvalidConfig(format!(
                "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
            ))),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn env_int(name: &str) -> Option<i64> {
    env::var(name).ok().and_then(|v| v.parse::<i64>().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| v.parse::<bool>().ok())
}

impl KeyAdminConfig {
    /// Load from `keyadmin.toml` (optional) and the environment.
    pub fn load() -> KeyAdminResult<Self> {
        Self::load_from(None)
    }

    /// Load from the given file (required when given) and the environment.
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. The config file
    /// 3. Environment variables
    pub fn load_from(path: Option<&Path>) -> KeyAdminResult<Self> {
        let defaults = PortalConfig::default();
        let logging = LoggingConfig::default();

        let builder = Config::builder()
            .set_default("portal.host", defaults.host)?
            .set_default("portal.port", i64::from(defaults.port))?
            .set_default("portal.path", defaults.path)?
            .set_default("portal.username", defaults.username)?
            .set_default("portal.password", defaults.password)?
            .set_default(
                "portal.timeout_ms",
                i64::try_from(defaults.timeout_ms).unwrap_or(i64::MAX),
            )?
            .set_default("portal.verify_tls", defaults.verify_tls)?
            .set_default("portal.use_tls", defaults.use_tls)?
            .set_default("portal.debug", defaults.debug)?
            .set_default("logging.enabled", logging.enabled)?
            .set_default("logging.level", logging.level)?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            .set_override_option("portal.host", env_string("KEYADMIN_HOST"))?
            .set_override_option("portal.port", env_int("KEYADMIN_PORT"))?
            .set_override_option("portal.path", env_string("KEYADMIN_PATH"))?
            .set_override_option("portal.username", env_string("KEYADMIN_USERNAME"))?
            .set_override_option("portal.password", env_string("KEYADMIN_PASSWORD"))?
            .set_override_option("portal.timeout_ms", env_int("KEYADMIN_TIMEOUT_MS"))?
            .set_override_option("portal.verify_tls", env_bool("KEYADMIN_VERIFY_TLS"))?
            .set_override_option("portal.use_tls", env_bool("KEYADMIN_USE_TLS"))?
            .set_override_option("portal.debug", env_bool("KEYADMIN_DEBUG"))?
            .set_override_option("logging.enabled", env_bool("KEYADMIN_LOGGING_ENABLED"))?
            .set_override_option("logging.level", env_string("KEYADMIN_LOG_LEVEL"))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> KeyAdminResult<()> {
        self.portal.validate()?;
        self.logging.validate()
    }
}
