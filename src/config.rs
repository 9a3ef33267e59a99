// ⚙️ Configuration - defaults → TOML file → environment → CLI flags

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Read when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "churn-advisor.toml";

pub const ENV_MODEL_PATH: &str = "CHURN_MODEL_PATH";
pub const ENV_BIND_ADDR: &str = "CHURN_BIND_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for this crate's targets; `RUST_LOG` still wins
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            model_path: PathBuf::from("models/churn_model.json"),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml_str(&content)
    }

    /// An explicit path must exist; the default file is optional
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Environment overrides, read through `lookup` so tests never touch the real env
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(path) = lookup(ENV_MODEL_PATH).filter(|v| !v.is_empty()) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.is_empty()) {
            self.server.bind_addr = addr;
        }
    }

    /// CLI flags win over everything else
    pub fn with_model_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.model_path = path;
        }
        self
    }

    pub fn with_bind_addr(mut self, addr: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.server.bind_addr = addr;
        }
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.model_path, PathBuf::from("models/churn_model.json"));
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            model_path = "/srv/models/churn.json"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/srv/models/churn.json"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(AppConfig::from_toml_str("model_path = [").is_err());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        assert!(AppConfig::load(Some(Path::new("/no/such/churn-advisor.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbind_addr = \"127.0.0.1:8080\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_precedence() {
        let env: HashMap<&str, &str> = [
            (ENV_MODEL_PATH, "/env/model.json"),
            (ENV_BIND_ADDR, "127.0.0.1:9000"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::from_toml_str("model_path = \"/file/model.json\"").unwrap();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.model_path, PathBuf::from("/env/model.json"));
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");

        let config = config
            .with_model_path(Some(PathBuf::from("/cli/model.json")))
            .with_bind_addr(None);
        assert_eq!(config.model_path, PathBuf::from("/cli/model.json"));
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config, AppConfig::default());
    }
}
