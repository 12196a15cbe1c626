//! Typed operation surface over a [`Storage`]
//!
//! One method per operation, each taking its argument struct and returning
//! either data or a human-readable confirmation.

use std::sync::Arc;

use serde::Serialize;

use crate::edit::describe;
use crate::params::*;
use crate::storage::Storage;
use crate::types::{
    DirectoryListing, EditOutcome, FileInfo, FsError, FsResult, ReadMultipleResult, SearchResult,
};

#[derive(Debug, Clone, Serialize)]
pub struct AllowedDirectories {
    pub allowed_directories: Vec<String>,
}

#[derive(Clone)]
pub struct FilesystemService {
    storage: Arc<dyn Storage>,
}

impl FilesystemService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub async fn read_text_file(&self, params: ReadTextFileParams) -> FsResult<String> {
        self.storage
            .read_text(&params.path, params.head, params.tail)
            .await
    }

    pub async fn read_multiple_files(
        &self,
        params: ReadMultipleFilesParams,
    ) -> FsResult<ReadMultipleResult> {
        Ok(self.storage.read_multiple(&params.paths).await)
    }

    pub async fn write_file(&self, params: WriteFileParams) -> FsResult<String> {
        self.storage.write_file(&params.path, &params.content).await?;
        Ok(format!("Successfully wrote to {}", params.path))
    }

    pub async fn edit_file(&self, params: EditFileParams) -> FsResult<String> {
        let outcome = self
            .storage
            .edit_file(&params.path, &params.edits, params.dry_run)
            .await?;

        Ok(match outcome {
            EditOutcome::Preview { diff } => format!("Preview of changes:\n{}", diff),
            EditOutcome::Applied { path, statuses } => {
                let mut out = format!("Successfully applied {} edit(s) to {}", statuses.len(), path);
                for (edit, status) in &statuses {
                    out.push('\n');
                    out.push_str(&describe(edit, status));
                }
                out
            }
        })
    }

    pub async fn create_directory(&self, params: CreateDirectoryParams) -> FsResult<String> {
        self.storage.create_directory(&params.path).await?;
        Ok(format!("Successfully created directory {}", params.path))
    }

    pub async fn list_directory(&self, params: ListDirectoryParams) -> FsResult<Vec<FileInfo>> {
        self.storage.list_directory(&params.path).await
    }

    pub async fn list_directory_with_sizes(
        &self,
        params: ListDirectoryParams,
    ) -> FsResult<DirectoryListing> {
        self.storage.list_directory_with_sizes(&params.path).await
    }

    pub async fn get_file_info(&self, params: GetFileInfoParams) -> FsResult<FileInfo> {
        self.storage.get_file_info(&params.path).await
    }

    pub async fn search_files(&self, params: SearchFilesParams) -> FsResult<SearchResult> {
        self.storage
            .search_files(&params.path, &params.pattern, params.recursive)
            .await
    }

    pub async fn move_file(&self, params: MoveFileParams) -> FsResult<String> {
        self.storage
            .move_file(&params.source, &params.destination)
            .await?;
        Ok(format!(
            "Successfully moved {} to {}",
            params.source, params.destination
        ))
    }

    pub async fn delete_file(&self, params: DeleteFileParams) -> FsResult<String> {
        self.storage.delete_file(&params.path, params.recursive).await?;
        Ok(format!("Successfully deleted {}", params.path))
    }

    pub fn list_allowed_directories(&self) -> Result<AllowedDirectories, FsError> {
        Ok(AllowedDirectories {
            allowed_directories: self.storage.allowed_directories(),
        })
    }
}
