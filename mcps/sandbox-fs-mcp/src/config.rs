//! Configuration for the sandboxed filesystem server
//!
//! Config is read from TOML:
//!
//! ```toml
//! [paths]
//! allowed = ["~/projects", "/tmp/scratch"]
//!
//! [limits]
//! max_file_size = 10485760
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sandbox::absolutize;
use crate::types::{FsError, FsResult};

const APP_NAME: &str = "sandbox-fs-mcp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub limits: Limits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directories operations may touch; empty means the working directory
    #[serde(default)]
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Largest file read in full, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

impl Config {
    /// Parse a config file; errors are fatal because the path was explicit
    pub fn from_file(path: &Path) -> FsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FsError::ConfigError(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| FsError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Load config from an explicit path or the standard locations
    ///
    /// Searched in order when `explicit` is `None`:
    /// 1. `./sandbox-fs-mcp.toml`
    /// 2. `$XDG_CONFIG_HOME/sandbox-fs-mcp/config.toml`
    /// 3. `~/.sandbox-fs-mcp.toml`
    /// 4. Default config if none found
    pub fn load(explicit: Option<&Path>) -> FsResult<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            tracing::info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        for path in Self::standard_locations() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => tracing::warn!("Skipping config: {}", e),
            }
        }

        tracing::info!("Using default configuration");
        Ok(Config::default())
    }

    fn standard_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(format!("{}.toml", APP_NAME))];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_NAME).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{}.toml", APP_NAME)));
        }

        paths
    }

    /// Allowed roots: CLI values win over the file, the working directory
    /// is the fallback
    pub fn allowed_roots(&self, cli_dirs: &[String]) -> FsResult<Vec<PathBuf>> {
        let configured: &[String] = if cli_dirs.is_empty() {
            &self.paths.allowed
        } else {
            cli_dirs
        };

        if configured.is_empty() {
            let cwd = std::env::current_dir()
                .map_err(|e| FsError::ConfigError(format!("working directory: {}", e)))?;
            return Ok(vec![cwd]);
        }

        Ok(configured.iter().map(|p| expand_home(p)).collect())
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix("~/"), home) {
        (Some(stripped), Some(home)) => home.join(stripped),
        (None, Some(home)) if path == "~" => home,
        _ => PathBuf::from(path),
    }
}

/// One `validate-dirs` result: the absolute path and what is wrong with it, if anything
#[derive(Debug)]
pub struct DirCheck {
    pub path: PathBuf,
    pub problem: Option<String>,
}

/// Check that each entry exists and is a directory, reporting absolute paths
pub fn check_directories(dirs: &[String]) -> Vec<DirCheck> {
    dirs.iter()
        .map(|dir| {
            let expanded = expand_home(dir);
            let path = absolutize(&expanded).unwrap_or(expanded);
            let problem = match std::fs::metadata(&path) {
                Ok(metadata) if metadata.is_dir() => None,
                Ok(_) => Some("not a directory".to_string()),
                Err(e) => Some(e.to_string()),
            };
            DirCheck { path, problem }
        })
        .collect()
}
