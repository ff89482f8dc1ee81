use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Address to listen on.
    pub host: String,
    pub port: u16,
    /// Static map record (JSON).
    pub map_path: Option<PathBuf>,
    /// Purchase-combination ids, shared across runs.
    pub move_dict_path: PathBuf,
    /// Where episode datasets and their archives are written.
    pub dataset_dir: PathBuf,
    /// Fixed RNG seed for reproducible move sampling.
    pub seed: Option<u64>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            map_path: None,
            move_dict_path: PathBuf::from("move_dict.json"),
            dataset_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl ServeConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// `host:port`, ready for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServeConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.move_dict_path, PathBuf::from("move_dict.json"));
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripmind.json");
        std::fs::write(&path, r#"{"port": 6000, "seed": 42}"#).unwrap();
        let config = ServeConfig::load(&path).unwrap();
        assert_eq!(config.port, 6000);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripmind.json");
        std::fs::write(&path, "port = 6000").unwrap();
        assert!(ServeConfig::load(&path).is_err());
        assert!(ServeConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
