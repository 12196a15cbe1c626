//! Type definitions for the sandboxed filesystem server

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use mcp_common::error::{OPERATION_ERROR, VALIDATION_ERROR};
use mcp_common::OperationFailure;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Response Types
// ============================================================================

/// Metadata for one file or directory, read fresh from a stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub is_directory: bool,
    /// Birth time; `None` where the filesystem does not record one
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    /// ls-style mode string, e.g. `drwxr-xr-x`
    pub permissions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub path: String,
    pub entries: Vec<FileInfo>,
    pub total_count: usize,
}

impl DirectoryListing {
    pub fn new(path: impl Into<String>, entries: Vec<FileInfo>) -> Self {
        Self {
            path: path.into(),
            total_count: entries.len(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub pattern: String,
    pub base_path: String,
    pub matches: Vec<FileInfo>,
    pub total_matches: usize,
}

impl SearchResult {
    pub fn new(pattern: impl Into<String>, base_path: impl Into<String>, matches: Vec<FileInfo>) -> Self {
        Self {
            pattern: pattern.into(),
            base_path: base_path.into(),
            total_matches: matches.len(),
            matches,
        }
    }
}

/// Per-path failure inside a batch read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFailure {
    pub kind: String,
    pub message: String,
}

impl From<&FsError> for PathFailure {
    fn from(err: &FsError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Response for read_multiple_files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadMultipleResult {
    pub files: BTreeMap<String, String>,
    pub errors: BTreeMap<String, PathFailure>,
}

/// Literal find/replace-all instruction
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EditOperation {
    #[schemars(description = "Text to search for (exact match, every occurrence is replaced)")]
    pub old_text: String,

    #[schemars(description = "Replacement text")]
    pub new_text: String,
}

/// Outcome of one edit within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    Replaced { occurrences: usize },
    NotFound,
}

/// Result of applying an edit batch
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Preview { diff: String },
    Applied { path: String, statuses: Vec<(EditOperation, EditStatus)> },
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Path must not be empty")]
    EmptyPath,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Access denied: {} is outside the allowed directories {}", path.display(), format_roots(roots))]
    PathNotAllowed { path: PathBuf, roots: Vec<PathBuf> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Directory not empty: {0} (use recursive=true to delete it)")]
    DirectoryNotEmpty(String),

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    ConfigError(String),
}

fn format_roots(roots: &[PathBuf]) -> String {
    let joined = roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

impl FsError {
    /// Classify an OS error raised while touching `path`
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path),
            _ => FsError::Io { path, source },
        }
    }
}

impl OperationFailure for FsError {
    fn kind(&self) -> &'static str {
        match self {
            FsError::EmptyPath => "EmptyPath",
            FsError::InvalidPath(_) => "InvalidPath",
            FsError::PathNotAllowed { .. } => "PathNotAllowed",
            FsError::NotFound(_) => "NotFound",
            FsError::NotADirectory(_) => "NotADirectory",
            FsError::DirectoryNotEmpty(_) => "DirectoryNotEmpty",
            FsError::FileTooLarge { .. } => "FileTooLarge",
            FsError::InvalidPattern { .. } | FsError::InvalidEdit(_) => VALIDATION_ERROR,
            FsError::Io { .. } | FsError::ConfigError(_) => OPERATION_ERROR,
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;
