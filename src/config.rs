//! Configuration module for the retrieval index.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.lookbook/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `LB_` and use double underscores
//! to separate nested levels:
//! - `LB_SEARCH__DEFAULT_LIMIT=5` sets `search.default_limit`
//! - `LB_SEMANTIC_SEARCH__MODEL=BGESmallENV15` sets `semantic_search.model`
//! - `LB_INDEX_PATH=/tmp/index` sets `index_path`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::corpus::DEFAULT_EXTENSIONS;
use crate::error::{RetrievalError, RetrievalResult};
use crate::vector::{DEFAULT_MODEL, ModelOptions, parse_embedding_model};

/// Directory holding the workspace configuration.
pub const CONFIG_DIR: &str = ".lookbook";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory of text documents to index
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// Directory the index artifact is written to and read from
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Workspace root directory (where .lookbook is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    /// Log level used when debug is off
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Corpus loading settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Embedding model settings
    #[serde(default)]
    pub semantic_search: SemanticSearchConfig,

    /// Query settings
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorpusConfig {
    /// File extensions (without the dot) loaded from the corpus directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SemanticSearchConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Where model weights are cached (defaults to ~/.lookbook/models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Show a progress bar while downloading weights
    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Number of results returned when none is requested
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_version() -> u32 {
    1
}
fn default_corpus_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_index_path() -> PathBuf {
    PathBuf::from("vector_index")
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}
fn default_embedding_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_limit() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            corpus_dir: default_corpus_dir(),
            index_path: default_index_path(),
            workspace_root: None,
            debug: false,
            log_level: default_log_level(),
            corpus: CorpusConfig::default(),
            semantic_search: SemanticSearchConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            cache_dir: None,
            show_download_progress: default_true(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .lookbook directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels; single underscores
            // stay part of the field name
            .merge(Env::prefixed("LB_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace config by looking for a .lookbook directory
    /// from the current directory up to the filesystem root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .lookbook is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Cannot read configuration file: {e}"))?;
        toml::from_str::<Settings>(&content).map_err(|e| {
            format!(
                "Configuration file is corrupted: {e}\nRun 'lookbook init --force' to regenerate."
            )
        })?;

        Ok(())
    }

    /// Reject values no command can work with.
    pub fn validate(&self) -> RetrievalResult<()> {
        if self.search.default_limit == 0 {
            return Err(RetrievalError::Config {
                reason: "search.default_limit must be at least 1".to_string(),
            });
        }
        if self.corpus.extensions.is_empty() {
            return Err(RetrievalError::Config {
                reason: "corpus.extensions must list at least one extension".to_string(),
            });
        }
        if parse_embedding_model(&self.semantic_search.model).is_none() {
            return Err(RetrievalError::UnknownModel {
                name: self.semantic_search.model.clone(),
            });
        }
        Ok(())
    }

    /// Resolve a configured path against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Resolved corpus directory
    pub fn corpus_path(&self) -> PathBuf {
        self.resolve(&self.corpus_dir)
    }

    /// Resolved index artifact directory
    pub fn index_dir(&self) -> PathBuf {
        self.resolve(&self.index_path)
    }

    /// Directory holding downloaded model weights
    pub fn models_dir(&self) -> PathBuf {
        if let Some(dir) = &self.semantic_search.cache_dir {
            return self.resolve(dir);
        }
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR).join("models"))
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("models"))
    }

    /// Options for loading the configured embedding model
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            cache_dir: self.models_dir(),
            show_download_progress: self.semantic_search.show_download_progress,
        }
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Create the default settings file under `root`
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = format!(
            r#"# Lookbook Configuration File

# Version of the configuration schema
version = 1

# Directory of text documents to index (relative to workspace root)
corpus_dir = "data"

# Directory holding the built index (relative to workspace root)
index_path = "vector_index"

# Global debug mode
debug = false

# Log level when debug is off: error, warn, info, debug, trace
log_level = "warn"

[corpus]
# File extensions loaded from corpus_dir (case-sensitive, no dot)
extensions = ["txt"]

[semantic_search]
# Model to use for embeddings
# Supported: AllMiniLML6V2, AllMiniLML12V2, BGESmallENV15, BGEBaseENV15, MultilingualE5Small
model = "{DEFAULT_MODEL}"

# Where model weights are cached (default: ~/.lookbook/models)
# cache_dir = "/path/to/models"

# Show a progress bar while downloading model weights
show_download_progress = true

[search]
# Number of results returned when -k is not given
default_limit = 2
"#
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
