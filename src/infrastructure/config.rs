use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub advisors: AdvisorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty or "*" allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Directory of bundled reference documents, one `.txt` per topic.
    pub kb_dir: PathBuf,
    pub chunk_size: usize,
    pub top_k: usize,
    /// Optional similarity floor; chunks scoring below it are excluded.
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Minimum share of personas that must agree for consensus framing.
    pub voting_threshold: f64,
    /// Persona name -> system prompt, overriding the built-in defaults.
    pub prompts: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-opus-20240229".into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            kb_dir: PathBuf::from("data/financial_kb"),
            chunk_size: 1000,
            top_k: 3,
            min_score: None,
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            voting_threshold: 0.6,
            prompts: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Loads from `FINADVISOR_CONFIG` (or `config.yaml`), falling back to
    /// the built-in defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FINADVISOR_CONFIG").unwrap_or_else(|_| "config.yaml".into());
        let path = Path::new(&path);

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
