//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use recollect_sdk::{EmbeddingConfig, MemoryConfig, SDKConfig};
use serde::Deserialize;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:7411";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory (RECOLLECT_DIR, else ~/.recollect)
    pub data_dir: PathBuf,
    /// Path to optional configuration file
    pub config_path: PathBuf,
    /// JSON log file path
    pub log_file: PathBuf,
    /// Listen address
    pub bind: SocketAddr,
    /// Store and embedding settings
    pub sdk: SDKConfig,
}

/// Optional `config.toml` contents
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    bind: Option<String>,
    memory: MemoryConfig,
    embedding: EmbeddingConfig,
}

impl Config {
    /// Load configuration from the environment and optional config file
    ///
    /// Standard directory structure:
    /// ```text
    /// ~/.recollect/
    /// ├── config.toml           # Optional configuration
    /// ├── memory.db             # Record log
    /// ├── vectors.db            # Vector index
    /// └── server/
    ///     └── server.log        # JSON logs
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

        // Use RECOLLECT_DIR env var if set, otherwise ~/.recollect
        let data_dir = std::env::var("RECOLLECT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".recollect"));

        Self::load_with(&data_dir, std::env::var("RECOLLECT_BIND").ok())
    }

    /// Load with an explicit directory and bind override
    pub fn load_with(data_dir: &Path, bind_override: Option<String>) -> anyhow::Result<Self> {
        let server_dir = data_dir.join("server");

        // Create directories if they don't exist
        std::fs::create_dir_all(&server_dir)
            .with_context(|| format!("Failed to create {}", server_dir.display()))?;

        let config_path = data_dir.join("config.toml");
        let file: FileConfig = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            FileConfig::default()
        };

        let bind = bind_override
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind))?;

        let sdk = SDKConfig::in_dir(data_dir)
            .with_memory(file.memory)
            .with_embedding(file.embedding);

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config_path,
            log_file: server_dir.join("server.log"),
            bind,
            sdk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recollect_sdk::EmbeddingBackend;

    #[test]
    fn test_config_load_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_with(temp_dir.path(), None).unwrap();

        assert!(temp_dir.path().join("server").exists());
        assert!(config.log_file.ends_with("server/server.log"));
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.sdk.record_log_path, temp_dir.path().join("memory.db"));
        assert_eq!(config.sdk.vector_index_path, temp_dir.path().join("vectors.db"));
    }

    #[test]
    fn test_config_file_and_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("config.toml"),
            r#"
bind = "0.0.0.0:9000"

[memory]
default_k = 4

[embedding]
backend = "hashing"
"#,
        )
        .unwrap();

        let config = Config::load_with(temp_dir.path(), None).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.sdk.memory.default_k, 4);
        assert_eq!(config.sdk.embedding.backend, EmbeddingBackend::Hashing);

        let config = Config::load_with(temp_dir.path(), Some("127.0.0.1:7500".into())).unwrap();
        assert_eq!(config.bind.port(), 7500);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Config::load_with(temp_dir.path(), Some("not-an-address".into())).is_err());
    }
}
