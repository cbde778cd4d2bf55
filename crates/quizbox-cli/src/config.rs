//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use quizbox_server::DEFAULT_BODY_LIMIT;
use quizbox_store::DEFAULT_FILE_NAME;

/// Port used when neither the config file nor `PORT` sets one
pub const DEFAULT_PORT: u16 = 3000;

/// Global configuration for quizbox
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    #[serde(deserialize_with = "deserialize_env_string")]
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(deserialize_with = "deserialize_env_path")]
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    #[serde(deserialize_with = "deserialize_env_path")]
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Deserialize a string that may be an environment variable reference like ${VAR}
fn deserialize_env_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    expand_env_var(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("environment variable in {raw:?} is not set"))
    })
}

fn deserialize_env_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_env_string(deserializer).map(PathBuf::from)
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

/// Parse a `PORT` value; blank or invalid values are ignored.
fn parse_port(value: Option<&str>) -> Option<u16> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u16>().ok())
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./quizbox.toml (current directory)
    /// 2. ~/.config/quizbox/config.toml
    ///
    /// If no config file found, returns default config. `PORT` from the
    /// environment overrides the configured port either way.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("quizbox.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "quizbox") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.apply_env();

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        let port = std::env::var("PORT").ok();
        if let Some(port) = parse_port(port.as_deref()) {
            self.server.port = port;
        } else if let Some(raw) = port {
            log::warn!("ignoring invalid PORT value {raw:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.body_limit, 100 * 1024);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.storage.file_name, "respostas.json");
        assert_eq!(config.assets.root, PathBuf::from("."));
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("QUIZBOX_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${QUIZBOX_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("QUIZBOX_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_port_values() {
        assert_eq!(parse_port(Some("8080")), Some(8080));
        assert_eq!(parse_port(Some(" 10000 ")), Some(10000));
        assert_eq!(parse_port(Some("")), None);
        assert_eq!(parse_port(Some("http")), None);
        assert_eq!(parse_port(Some("70000")), None);
        assert_eq!(parse_port(None), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
body_limit = 4096

[storage]
data_dir = "/var/lib/quizbox"
file_name = "results.json"

[assets]
root = "/srv/quiz"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.body_limit, 4096);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/quizbox"));
        assert_eq!(config.storage.file_name, "results.json");
        assert_eq!(config.assets.root, PathBuf::from("/srv/quiz"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.file_name, "respostas.json");
    }

    #[test]
    fn data_dir_from_env_reference() {
        std::env::set_var("QUIZBOX_TEST_DATA_DIR", "/tmp/quizbox-data");
        let config: Config =
            toml::from_str("[storage]\ndata_dir = \"${QUIZBOX_TEST_DATA_DIR}\"\n").unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/quizbox-data"));
        std::env::remove_var("QUIZBOX_TEST_DATA_DIR");
    }

    #[test]
    fn missing_env_reference_is_an_error() {
        let result: Result<Config, _> =
            toml::from_str("[server]\nhost = \"${NONEXISTENT_VAR_67890}\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizbox.toml");
        std::fs::write(&path, "[storage]\nfile_name = \"scores.json\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage.file_name, "scores.json");
    }

    #[test]
    fn port_env_overrides_file_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizbox.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        std::env::set_var("PORT", "8081");
        let overridden = Config::from_file(&path).unwrap();
        std::env::set_var("PORT", "not-a-port");
        let invalid = Config::from_file(&path).unwrap();
        std::env::remove_var("PORT");
        let from_file = Config::from_file(&path).unwrap();

        assert_eq!(overridden.server.port, 8081);
        assert_eq!(invalid.server.port, 9000);
        assert_eq!(from_file.server.port, 9000);
    }

    #[test]
    fn from_file_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("nope.toml")).is_err());
    }
}
