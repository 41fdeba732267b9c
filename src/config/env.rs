// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use super::file::OfficeConfig;
use crate::engine::EngineEndpoint;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 2083;
pub const DEFAULT_OUTPUT_DIR: &str = "/home/mcp-libreoffice/output";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// A problem with one configuration variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub var: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.var, self.message)
    }
}

/// Errors block startup; warnings are logged and startup continues.
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<ConfigIssue>,
    pub errors: Vec<ConfigIssue>,
}

impl ConfigValidation {
    fn of(config: &EnvConfig) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let issue = |var: &'static str, message: String| ConfigIssue { var, message };

        if config.host.trim().is_empty() {
            errors.push(issue("LIBREOFFICE_HOST", "is empty".to_string()));
        }
        if config.port == 0 {
            errors.push(issue("LIBREOFFICE_PORT", "must be between 1 and 65535".to_string()));
        }
        for (var, timeout) in [
            ("LIBREOFFICE_CONNECT_TIMEOUT_SECS", config.connect_timeout),
            ("LIBREOFFICE_REQUEST_TIMEOUT_SECS", config.request_timeout),
        ] {
            if timeout.is_zero() {
                errors.push(issue(var, "must be positive".to_string()));
            }
        }
        if config.output_dir.is_relative() {
            warnings.push(issue(
                "LIBREOFFICE_OUTPUT_DIR",
                format!(
                    "'{}' is relative; saved files depend on the working directory",
                    config.output_dir.display()
                ),
            ));
        }

        Self { warnings, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// One line per issue, errors first
    pub fn report(&self) -> String {
        if self.errors.is_empty() && self.warnings.is_empty() {
            return "Configuration OK".to_string();
        }
        self.errors
            .iter()
            .map(|e| format!("error   {}", e))
            .chain(self.warnings.iter().map(|w| format!("warning {}", w)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Environment configuration - all env vars in one place
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Engine host (LIBREOFFICE_HOST)
    pub host: String,
    /// Engine port (LIBREOFFICE_PORT)
    pub port: u16,
    /// Where saved documents land (LIBREOFFICE_OUTPUT_DIR)
    pub output_dir: PathBuf,
    /// Socket connect + handshake bound (LIBREOFFICE_CONNECT_TIMEOUT_SECS)
    pub connect_timeout: Duration,
    /// Per-request bound (LIBREOFFICE_REQUEST_TIMEOUT_SECS)
    pub request_timeout: Duration,
    /// Refuse to register sessions while disconnected (LIBREOFFICE_REQUIRE_CONNECTION)
    pub require_connection: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            require_connection: true,
        }
    }
}

impl EnvConfig {
    /// Load all configuration (call once at startup). Environment wins over the file.
    pub fn load() -> Self {
        info!("Loading environment configuration");
        Self::from_sources(&OfficeConfig::load(), |name| std::env::var(name).ok())
    }

    /// Merge defaults, the config file and an env lookup.
    pub fn from_sources(file: &OfficeConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let host = read("LIBREOFFICE_HOST")
            .or_else(|| file.engine.host.clone())
            .unwrap_or(defaults.host);

        let port = parse_env(&read, "LIBREOFFICE_PORT")
            .or(file.engine.port)
            .unwrap_or(defaults.port);

        let output_dir = read("LIBREOFFICE_OUTPUT_DIR")
            .map(PathBuf::from)
            .or_else(|| file.output.dir.clone())
            .unwrap_or(defaults.output_dir);

        let connect_timeout = parse_env(&read, "LIBREOFFICE_CONNECT_TIMEOUT_SECS")
            .or(file.engine.connect_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let request_timeout = parse_env(&read, "LIBREOFFICE_REQUEST_TIMEOUT_SECS")
            .or(file.engine.request_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let require_connection = read("LIBREOFFICE_REQUIRE_CONNECTION")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.require_connection);

        debug!(host = %host, port, output_dir = %output_dir.display(), "Engine configuration");

        Self {
            host,
            port,
            output_dir,
            connect_timeout,
            request_timeout,
            require_connection,
        }
    }

    pub fn endpoint(&self) -> EngineEndpoint {
        EngineEndpoint {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigValidation {
        ConfigValidation::of(self)
    }
}

fn parse_env<T: std::str::FromStr>(read: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = read(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(name, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
