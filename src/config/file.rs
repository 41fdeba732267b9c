// src/config/file.rs
// File-based configuration from ~/.office-mcp/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct OfficeConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// `[engine]` section
#[derive(Debug, Deserialize, Default)]
pub struct EngineSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// `[output]` section
#[derive(Debug, Deserialize, Default)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
}

impl OfficeConfig {
    /// Load config from ~/.office-mcp/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Directory holding config.toml and the user-level .env
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".office-mcp")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[engine]
host = "office.internal"
port = 2002

[output]
dir = "/srv/documents"
"#;
        let config: OfficeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.host.as_deref(), Some("office.internal"));
        assert_eq!(config.engine.port, Some(2002));
        assert_eq!(config.output.dir, Some(PathBuf::from("/srv/documents")));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: OfficeConfig = toml::from_str("").unwrap();
        assert!(config.engine.host.is_none());
        assert!(config.output.dir.is_none());
    }

    #[test]
    fn test_unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine\nport = ").unwrap();
        let config = OfficeConfig::load_from(&path);
        assert!(config.engine.port.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = OfficeConfig::load_from(&dir.path().join("absent.toml"));
        assert!(config.engine.host.is_none());
    }
}
