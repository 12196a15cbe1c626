//! Operation registration table
//!
//! The single place that decides which operations exist, what they are
//! called, and which service method handles them.

use std::sync::Arc;

use mcp_common::OperationRegistry;

use crate::params::*;
use crate::service::FilesystemService;

pub fn registry(service: Arc<FilesystemService>) -> OperationRegistry<FilesystemService> {
    OperationRegistry::new(service)
        .operation(
            "read_text_file",
            "Read a text file. Use head or tail to return only the first or last N lines.",
            |svc: Arc<FilesystemService>, args: ReadTextFileParams| async move {
                svc.read_text_file(args).await
            },
        )
        .operation(
            "read_multiple_files",
            "Read several files at once. Failures are reported per path without aborting the batch.",
            |svc: Arc<FilesystemService>, args: ReadMultipleFilesParams| async move {
                svc.read_multiple_files(args).await
            },
        )
        .operation(
            "write_file",
            "Create or overwrite a file, creating parent directories as needed.",
            |svc: Arc<FilesystemService>, args: WriteFileParams| async move {
                svc.write_file(args).await
            },
        )
        .operation(
            "edit_file",
            "Apply literal find/replace-all edits in order. With dry_run, return a unified diff instead of writing.",
            |svc: Arc<FilesystemService>, args: EditFileParams| async move {
                svc.edit_file(args).await
            },
        )
        .operation(
            "create_directory",
            "Create a directory and any missing parents. Succeeds if it already exists.",
            |svc: Arc<FilesystemService>, args: CreateDirectoryParams| async move {
                svc.create_directory(args).await
            },
        )
        .operation(
            "list_directory",
            "List the immediate children of a directory, directories first.",
            |svc: Arc<FilesystemService>, args: ListDirectoryParams| async move {
                svc.list_directory(args).await
            },
        )
        .operation(
            "list_directory_with_sizes",
            "List a directory with sizes and a total entry count.",
            |svc: Arc<FilesystemService>, args: ListDirectoryParams| async move {
                svc.list_directory_with_sizes(args).await
            },
        )
        .operation(
            "get_file_info",
            "Get size, timestamps, type and permissions of a file or directory.",
            |svc: Arc<FilesystemService>, args: GetFileInfoParams| async move {
                svc.get_file_info(args).await
            },
        )
        .operation(
            "search_files",
            "Find files whose name matches a glob pattern. Non-recursive searches return regular files only.",
            |svc: Arc<FilesystemService>, args: SearchFilesParams| async move {
                svc.search_files(args).await
            },
        )
        .operation(
            "move_file",
            "Move or rename a file or directory. Both paths must be inside the allowed directories.",
            |svc: Arc<FilesystemService>, args: MoveFileParams| async move {
                svc.move_file(args).await
            },
        )
        .operation(
            "delete_file",
            "Delete a file or directory. Non-empty directories require recursive=true.",
            |svc: Arc<FilesystemService>, args: DeleteFileParams| async move {
                svc.delete_file(args).await
            },
        )
        .raw_operation(
            "list_allowed_directories",
            "List the directories this server is allowed to access.",
            |svc: Arc<FilesystemService>, _args| async move { svc.list_allowed_directories() },
        )
}
