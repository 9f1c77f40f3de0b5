//! errcodes configuration
//!
//! Settings are merged from several layers.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (ERRCODES_MAP, ERRCODES_OUT_DIR)
//! 3. Project-level (errcodes.toml)
//! 4. Default values
//! ```
//!
//! # Project file
//!
//! ```toml
//! [extract]
//! map_path = "scripts/error-codes/codes.json"
//! out_dir = "src/shared/errors"
//! assertion_name = "invariant"
//! policy = "placeholder"
//! extensions = ["js", "ts"]
//! ```
//!
//! Relative paths in the project file are resolved against its directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::{ExtractOptions, UnfoldablePolicy};

/// Project configuration file name
pub const CONFIG_FILE: &str = "errcodes.toml";

/// Environment variable naming the code map
pub const ENV_MAP: &str = "ERRCODES_MAP";
/// Environment variable naming the output directory
pub const ENV_OUT_DIR: &str = "ERRCODES_OUT_DIR";

/// Extensions scanned when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `errcodes.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// `[extract]` section; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub map_path: Option<PathBuf>,
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
    #[serde(default)]
    pub assertion_name: Option<String>,
    #[serde(default)]
    pub decoder_url: Option<String>,
    #[serde(default)]
    pub policy: Option<UnfoldablePolicy>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

impl ExtractConfig {
    /// Fill unset fields from `lower`
    pub fn or(
        self,
        lower: ExtractConfig,
    ) -> ExtractConfig {
        ExtractConfig {
            map_path: self.map_path.or(lower.map_path),
            out_dir: self.out_dir.or(lower.out_dir),
            assertion_name: self.assertion_name.or(lower.assertion_name),
            decoder_url: self.decoder_url.or(lower.decoder_url),
            policy: self.policy.or(lower.policy),
            extensions: self.extensions.or(lower.extensions),
        }
    }

    /// Layer read from the environment through `lookup`
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> ExtractConfig {
        let path = |name: &str| lookup(name).filter(|value| !value.is_empty()).map(PathBuf::from);
        ExtractConfig {
            map_path: path(ENV_MAP),
            out_dir: path(ENV_OUT_DIR),
            ..ExtractConfig::default()
        }
    }

    /// Session options with defaults for unset fields
    pub fn to_options(&self) -> ExtractOptions {
        let defaults = ExtractOptions::default();
        ExtractOptions {
            error_map_path: self.map_path.clone(),
            app_error_path: self.out_dir.clone(),
            assertion_name: self
                .assertion_name
                .clone()
                .unwrap_or(defaults.assertion_name),
            decoder_url: self.decoder_url.clone().unwrap_or(defaults.decoder_url),
            policy: self.policy.unwrap_or(defaults.policy),
        }
    }

    /// Configured extensions, without leading dots
    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(extensions) => extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            None => DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    fn resolve_paths(
        &mut self,
        base: &Path,
    ) {
        for path in [&mut self.map_path, &mut self.out_dir].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Parse project configuration text
pub fn parse_project_config(text: &str) -> Result<ProjectConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Load a project file; relative paths inside it are made relative to its directory
pub fn load_project_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_project_config(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(base) = path.parent() {
        config.extract.resolve_paths(base);
    }
    Ok(config)
}

/// Find `errcodes.toml` in `start` or one of its ancestors
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}
