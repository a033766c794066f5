//! Configuration management for recollect.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (RECOLLECT_*)
//! 2. Config file (RECOLLECT_CONFIG, else <data_dir>/config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use directories::ProjectDirs;
use recollect_sdk::{EmbeddingConfig, MemoryConfig, SDKConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store locations
    pub paths: PathsConfig,

    /// Coordinator settings (k defaults, timeouts)
    pub memory: MemoryConfig,

    /// Embedding backend
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for recollect data
    pub data_dir: PathBuf,

    /// Record log database (default: <data_dir>/memory.db)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_log: Option<PathBuf>,

    /// Vector index database (default: <data_dir>/vectors.db)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_index: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            record_log: None,
            vector_index: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "recollect", "recollect") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".recollect")
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Apply RECOLLECT_RECORD_LOG / RECOLLECT_VECTOR_INDEX overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("RECOLLECT_RECORD_LOG").filter(|p| !p.is_empty()) {
            self.paths.record_log = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("RECOLLECT_VECTOR_INDEX").filter(|p| !p.is_empty()) {
            self.paths.vector_index = Some(PathBuf::from(path));
        }
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("RECOLLECT_CONFIG") {
            PathBuf::from(path)
        } else {
            default_data_dir().join("config.toml")
        }
    }

    pub fn record_log_path(&self) -> PathBuf {
        self.paths
            .record_log
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("memory.db"))
    }

    pub fn vector_index_path(&self) -> PathBuf {
        self.paths
            .vector_index
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("vectors.db"))
    }

    /// SDK configuration for these settings
    pub fn sdk_config(&self) -> SDKConfig {
        SDKConfig::default()
            .with_record_log(self.record_log_path())
            .with_vector_index(self.vector_index_path())
            .with_memory(self.memory.clone())
            .with_embedding(self.embedding.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_sdk::EmbeddingBackend;
    use std::collections::HashMap;

    #[test]
    fn test_default_paths_under_data_dir() {
        let config = Config::default();
        assert_eq!(config.record_log_path(), config.paths.data_dir.join("memory.db"));
        assert_eq!(config.vector_index_path(), config.paths.data_dir.join("vectors.db"));
        assert!(config.sdk_config().validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.memory.default_k, 3);
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[paths]
data_dir = "/srv/recollect"

[memory]
default_k = 5

[embedding]
backend = "hashing"
hashing_dimensions = 64
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("/srv/recollect"));
        assert_eq!(config.memory.default_k, 5);
        assert_eq!(config.memory.recall_k, 1);
        assert_eq!(config.embedding.backend, EmbeddingBackend::Hashing);
        assert_eq!(config.record_log_path(), PathBuf::from("/srv/recollect/memory.db"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RECOLLECT_RECORD_LOG", "/tmp/log.db"),
            ("RECOLLECT_VECTOR_INDEX", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.record_log_path(), PathBuf::from("/tmp/log.db"));
        assert_eq!(config.vector_index_path(), config.paths.data_dir.join("vectors.db"));
    }

    #[test]
    fn test_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("[paths]"));
        assert!(rendered.contains("default_k = 3"));
    }
}
