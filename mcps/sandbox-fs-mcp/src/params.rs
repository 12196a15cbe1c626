//! Argument types for the filesystem operations
//!
//! Each struct doubles as the operation's input schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::EditOperation;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadTextFileParams {
    #[schemars(description = "Path to the file to read")]
    pub path: String,

    #[schemars(description = "Only return the first N lines")]
    #[serde(default)]
    pub head: Option<usize>,

    #[schemars(description = "Only return the last N lines (wins over head when both are set)")]
    #[serde(default)]
    pub tail: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadMultipleFilesParams {
    #[schemars(description = "Paths of the files to read")]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    #[schemars(description = "Path to the file to write")]
    pub path: String,

    #[schemars(description = "Content to write to the file")]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EditFileParams {
    #[schemars(description = "Path to the file to edit")]
    pub path: String,

    #[schemars(description = "Edits applied in order, each replacing every occurrence")]
    pub edits: Vec<EditOperation>,

    #[schemars(description = "Return a unified diff instead of writing (default: false)")]
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateDirectoryParams {
    #[schemars(description = "Directory to create, parents included")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryParams {
    #[schemars(description = "Path to the directory to list")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetFileInfoParams {
    #[schemars(description = "Path to the file or directory")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    #[schemars(description = "Glob pattern matched against file names (e.g., '*.rs')")]
    pub pattern: String,

    #[schemars(description = "Base directory to search from (default: '.')")]
    #[serde(default = "default_search_path")]
    pub path: String,

    #[schemars(description = "Search subdirectories (default: true)")]
    #[serde(default = "default_true")]
    pub recursive: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveFileParams {
    #[schemars(description = "Source path")]
    pub source: String,

    #[schemars(description = "Destination path")]
    pub destination: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    #[schemars(description = "Path to the file or directory to delete")]
    pub path: String,

    #[schemars(description = "Delete non-empty directories (default: false)")]
    #[serde(default)]
    pub recursive: bool,
}

fn default_search_path() -> String {
    ".".to_string()
}

fn default_true() -> bool {
    true
}
