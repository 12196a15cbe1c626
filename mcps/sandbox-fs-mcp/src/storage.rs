//! Storage engine
//!
//! [`Storage`] is the seam between the typed service and the filesystem.
//! [`LocalStorage`] is the production implementation: every method runs
//! each path argument through the sandbox before the first OS call.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Limits;
use crate::edit::{apply_edits, unified_diff};
use crate::info;
use crate::sandbox::{Sandbox, ValidatedPath};
use crate::types::{
    DirectoryListing, EditOperation, EditOutcome, FileInfo, FsError, FsResult, PathFailure,
    ReadMultipleResult, SearchResult,
};

/// Filesystem verbs, one method each
#[async_trait]
pub trait Storage: Send + Sync {
    /// Allowed root directories, in configured order
    fn allowed_directories(&self) -> Vec<String>;

    /// Read a text file, optionally only its first or last lines
    ///
    /// When both `head` and `tail` are given, `tail` wins. Zero counts are
    /// treated as absent.
    async fn read_text(&self, path: &str, head: Option<usize>, tail: Option<usize>)
        -> FsResult<String>;

    /// Read several files; one path failing never affects the others
    async fn read_multiple(&self, paths: &[String]) -> ReadMultipleResult;

    /// Create or overwrite a file, creating missing parent directories
    async fn write_file(&self, path: &str, content: &str) -> FsResult<()>;

    /// Apply literal replace-all edits in order, or preview them
    async fn edit_file(&self, path: &str, edits: &[EditOperation], dry_run: bool)
        -> FsResult<EditOutcome>;

    /// Create a directory and its ancestors; no-op when it exists
    async fn create_directory(&self, path: &str) -> FsResult<()>;

    /// Immediate children, directories first, then by case-insensitive name
    async fn list_directory(&self, path: &str) -> FsResult<Vec<FileInfo>>;

    async fn list_directory_with_sizes(&self, path: &str) -> FsResult<DirectoryListing> {
        let entries = self.list_directory(path).await?;
        Ok(DirectoryListing::new(path, entries))
    }

    async fn get_file_info(&self, path: &str) -> FsResult<FileInfo>;

    /// Match a glob against file names under `path`
    async fn search_files(&self, path: &str, pattern: &str, recursive: bool)
        -> FsResult<SearchResult>;

    async fn move_file(&self, source: &str, destination: &str) -> FsResult<()>;

    async fn delete_file(&self, path: &str, recursive: bool) -> FsResult<()>;
}

/// Local filesystem storage confined to a [`Sandbox`]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    sandbox: Sandbox,
    limits: Limits,
}

impl LocalStorage {
    pub fn new(sandbox: Sandbox, limits: Limits) -> Self {
        Self { sandbox, limits }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Read a whole file, refusing anything over `max_file_size`
    async fn read_whole(&self, validated: &ValidatedPath, display: &str) -> FsResult<String> {
        let metadata = fs::metadata(validated)
            .await
            .map_err(|e| FsError::io(display, e))?;

        if metadata.len() > self.limits.max_file_size {
            return Err(FsError::FileTooLarge {
                size: metadata.len(),
                max: self.limits.max_file_size,
            });
        }

        fs::read_to_string(validated)
            .await
            .map_err(|e| FsError::io(display, e))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn allowed_directories(&self) -> Vec<String> {
        self.sandbox
            .roots()
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    async fn read_text(
        &self,
        path: &str,
        head: Option<usize>,
        tail: Option<usize>,
    ) -> FsResult<String> {
        let validated = self.sandbox.validate(path)?;

        let head = head.filter(|n| *n > 0);
        let tail = tail.filter(|n| *n > 0);

        if let Some(n) = tail {
            if head.is_some() {
                tracing::debug!("Both head and tail given for {}, using tail", path);
            }
            let content = self.read_whole(&validated, path).await?;
            return Ok(last_lines(&content, n));
        }

        if let Some(n) = head {
            return read_first_lines(&validated, path, n).await;
        }

        self.read_whole(&validated, path).await
    }

    async fn read_multiple(&self, paths: &[String]) -> ReadMultipleResult {
        let mut result = ReadMultipleResult::default();

        for path in paths {
            match self.read_text(path, None, None).await {
                Ok(content) => {
                    result.files.insert(path.clone(), content);
                }
                Err(e) => {
                    tracing::debug!("read_multiple: {} failed: {}", path, e);
                    result.errors.insert(path.clone(), PathFailure::from(&e));
                }
            }
        }

        result
    }

    async fn write_file(&self, path: &str, content: &str) -> FsResult<()> {
        let validated = self.sandbox.validate(path)?;

        if let Some(parent) = validated.as_path().parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::io(parent.display().to_string(), e))?;
        }

        fs::write(&validated, content)
            .await
            .map_err(|e| FsError::io(path, e))?;

        tracing::info!("Wrote {} bytes to {}", content.len(), validated);
        Ok(())
    }

    async fn edit_file(
        &self,
        path: &str,
        edits: &[EditOperation],
        dry_run: bool,
    ) -> FsResult<EditOutcome> {
        let validated = self.sandbox.validate(path)?;

        if edits.iter().any(|e| e.old_text.is_empty()) {
            return Err(FsError::InvalidEdit("old_text must not be empty".to_string()));
        }

        let original = self.read_whole(&validated, path).await?;
        let (modified, statuses) = apply_edits(&original, edits);

        if dry_run {
            let diff = unified_diff(&original, &modified, path);
            return Ok(EditOutcome::Preview { diff });
        }

        fs::write(&validated, &modified)
            .await
            .map_err(|e| FsError::io(path, e))?;

        tracing::info!("Applied {} edit(s) to {}", edits.len(), validated);
        Ok(EditOutcome::Applied {
            path: path.to_string(),
            statuses: edits.iter().cloned().zip(statuses).collect(),
        })
    }

    async fn create_directory(&self, path: &str) -> FsResult<()> {
        let validated = self.sandbox.validate(path)?;

        match fs::metadata(&validated).await {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            Ok(_) => return Err(FsError::NotADirectory(path.to_string())),
            Err(_) => {}
        }

        fs::create_dir_all(&validated)
            .await
            .map_err(|e| FsError::io(path, e))?;

        tracing::info!("Created directory {}", validated);
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> FsResult<Vec<FileInfo>> {
        let validated = self.sandbox.validate(path)?;
        ensure_directory(&validated, path).await?;

        let mut read_dir = fs::read_dir(&validated)
            .await
            .map_err(|e| FsError::io(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FsError::io(path, e))?
        {
            let entry_path = entry.path();
            match info::file_info(&entry_path, &entry_path.display().to_string()).await {
                Ok(file_info) => entries.push(file_info),
                Err(e) => tracing::debug!("Skipping {}: {}", entry_path.display(), e),
            }
        }

        entries.sort_by_key(|e| (!e.is_directory, e.name.to_lowercase()));
        Ok(entries)
    }

    async fn get_file_info(&self, path: &str) -> FsResult<FileInfo> {
        let validated = self.sandbox.validate(path)?;
        let mut found = info::file_info(validated.as_path(), path).await?;

        // a symlink is reported under its own name, with its target's stat
        if let Some(name) = Path::new(path).file_name() {
            found.name = name.to_string_lossy().to_string();
        }
        Ok(found)
    }

    async fn search_files(
        &self,
        path: &str,
        pattern: &str,
        recursive: bool,
    ) -> FsResult<SearchResult> {
        let validated = self.sandbox.validate(path)?;
        let glob = glob::Pattern::new(pattern).map_err(|e| FsError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        ensure_directory(&validated, path).await?;

        let matches = if recursive {
            self.search_tree(validated.as_path(), &glob).await?
        } else {
            self.search_children(validated.as_path(), &glob).await?
        };

        tracing::debug!("search {} under {}: {} match(es)", pattern, path, matches.len());
        Ok(SearchResult::new(pattern, path, matches))
    }

    async fn move_file(&self, source: &str, destination: &str) -> FsResult<()> {
        let src = self.sandbox.validate_entry(source)?;
        let dst = self.sandbox.validate_entry(destination)?;

        fs::symlink_metadata(&src)
            .await
            .map_err(|e| FsError::io(source, e))?;

        if let Some(parent) = dst.as_path().parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FsError::io(parent.display().to_string(), e))?;
        }

        match fs::rename(&src, &dst).await {
            Ok(()) => {}
            Err(e) if is_cross_device(&e) => {
                tracing::debug!("{} -> {} crosses devices, copying", src, dst);
                copy_recursively(src.as_path(), dst.as_path()).await?;
                remove_any(src.as_path(), source).await?;
            }
            Err(e) => return Err(FsError::io(source, e)),
        }

        tracing::info!("Moved {} -> {}", src, dst);
        Ok(())
    }

    async fn delete_file(&self, path: &str, recursive: bool) -> FsResult<()> {
        let validated = self.sandbox.validate_entry(path)?;

        let metadata = fs::symlink_metadata(&validated)
            .await
            .map_err(|e| FsError::io(path, e))?;

        if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(&validated)
                    .await
                    .map_err(|e| FsError::io(path, e))?;
            } else {
                let mut read_dir = fs::read_dir(&validated)
                    .await
                    .map_err(|e| FsError::io(path, e))?;
                let has_entries = read_dir
                    .next_entry()
                    .await
                    .map_err(|e| FsError::io(path, e))?
                    .is_some();
                if has_entries {
                    return Err(FsError::DirectoryNotEmpty(path.to_string()));
                }
                fs::remove_dir(&validated)
                    .await
                    .map_err(|e| FsError::io(path, e))?;
            }
        } else {
            fs::remove_file(&validated)
                .await
                .map_err(|e| FsError::io(path, e))?;
        }

        tracing::info!("Deleted {}", validated);
        Ok(())
    }
}

impl LocalStorage {
    /// Depth-first, pre-order walk matching every non-directory entry
    async fn search_tree(&self, base: &Path, glob: &glob::Pattern) -> FsResult<Vec<FileInfo>> {
        let mut matches = Vec::new();
        let mut stack = vec![base.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(read_dir) => read_dir,
                Err(e) if dir != base => {
                    tracing::debug!("Skipping unreadable {}: {}", dir.display(), e);
                    continue;
                }
                Err(e) => return Err(FsError::io(dir.display().to_string(), e)),
            };

            let mut subdirs = Vec::new();
            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| FsError::io(dir.display().to_string(), e))?
            {
                let entry_path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| FsError::io(entry_path.display().to_string(), e))?;

                if file_type.is_dir() {
                    subdirs.push(entry_path);
                    continue;
                }

                // symlinked directories are neither descended nor matched
                if file_type.is_symlink() && points_to_directory(&entry_path).await {
                    continue;
                }

                if glob.matches(&entry.file_name().to_string_lossy()) {
                    if let Some(found) = self.describe_match(&entry_path, file_type.is_symlink()).await {
                        matches.push(found);
                    }
                }
            }

            stack.extend(subdirs.into_iter().rev());
        }

        Ok(matches)
    }

    /// Immediate children that are regular files
    async fn search_children(&self, base: &Path, glob: &glob::Pattern) -> FsResult<Vec<FileInfo>> {
        let mut read_dir = fs::read_dir(base)
            .await
            .map_err(|e| FsError::io(base.display().to_string(), e))?;

        let mut matches = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FsError::io(base.display().to_string(), e))?
        {
            if !glob.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let entry_path = entry.path();
            let is_file = fs::metadata(&entry_path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let is_symlink = entry
                .file_type()
                .await
                .map(|t| t.is_symlink())
                .unwrap_or(false);
            if let Some(found) = self.describe_match(&entry_path, is_symlink).await {
                matches.push(found);
            }
        }

        Ok(matches)
    }

    /// FileInfo for a search hit; symlinks must resolve inside the sandbox
    async fn describe_match(&self, entry_path: &Path, is_symlink: bool) -> Option<FileInfo> {
        let shown = entry_path.display().to_string();

        if is_symlink {
            if let Err(e) = self.sandbox.validate(&shown) {
                tracing::debug!("Skipping symlink {}: {}", shown, e);
                return None;
            }
        }

        match info::file_info(entry_path, &shown).await {
            Ok(found) => Some(found),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", shown, e);
                None
            }
        }
    }
}

async fn ensure_directory(validated: &ValidatedPath, display: &str) -> FsResult<()> {
    let metadata = fs::metadata(validated)
        .await
        .map_err(|e| FsError::io(display, e))?;
    if !metadata.is_dir() {
        return Err(FsError::NotADirectory(display.to_string()));
    }
    Ok(())
}

async fn points_to_directory(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// Read at most `n` lines without loading the rest of the file
async fn read_first_lines(validated: &ValidatedPath, display: &str, n: usize) -> FsResult<String> {
    let file = fs::File::open(validated)
        .await
        .map_err(|e| FsError::io(display, e))?;
    let mut reader = BufReader::new(file);

    let mut out = String::new();
    for _ in 0..n {
        let read = reader
            .read_line(&mut out)
            .await
            .map_err(|e| FsError::io(display, e))?;
        if read == 0 {
            break;
        }
    }

    Ok(out)
}

/// Last `n` lines of `content`, line terminators preserved
fn last_lines(content: &str, n: usize) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].concat()
}

#[cfg(unix)]
fn is_cross_device(err: &std::io::Error) -> bool {
    const EXDEV: i32 = 18;
    err.raw_os_error() == Some(EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &std::io::Error) -> bool {
    const ERROR_NOT_SAME_DEVICE: i32 = 17;
    err.raw_os_error() == Some(ERROR_NOT_SAME_DEVICE)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &std::io::Error) -> bool {
    false
}

/// Copy a tree without following symlinks on either side
async fn copy_recursively(src: &Path, dst: &Path) -> FsResult<()> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    while let Some((from, to)) = pending.pop() {
        let metadata = fs::symlink_metadata(&from)
            .await
            .map_err(|e| FsError::io(from.display().to_string(), e))?;

        if let Ok(existing) = fs::symlink_metadata(&to).await {
            if existing.file_type().is_symlink() {
                fs::remove_file(&to)
                    .await
                    .map_err(|e| FsError::io(to.display().to_string(), e))?;
            }
        }

        if metadata.file_type().is_symlink() {
            copy_link(&from, &to).await?;
            continue;
        }

        if !metadata.is_dir() {
            fs::copy(&from, &to)
                .await
                .map_err(|e| FsError::io(to.display().to_string(), e))?;
            continue;
        }

        fs::create_dir_all(&to)
            .await
            .map_err(|e| FsError::io(to.display().to_string(), e))?;

        let mut read_dir = fs::read_dir(&from)
            .await
            .map_err(|e| FsError::io(from.display().to_string(), e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| FsError::io(from.display().to_string(), e))?
        {
            pending.push((entry.path(), to.join(entry.file_name())));
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn copy_link(from: &Path, to: &Path) -> FsResult<()> {
    let target = fs::read_link(from)
        .await
        .map_err(|e| FsError::io(from.display().to_string(), e))?;
    fs::symlink(&target, to)
        .await
        .map_err(|e| FsError::io(to.display().to_string(), e))
}

#[cfg(not(unix))]
async fn copy_link(from: &Path, _to: &Path) -> FsResult<()> {
    Err(FsError::io(
        from.display().to_string(),
        std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "copying symlinks across devices is not supported here",
        ),
    ))
}

async fn remove_any(path: &Path, display: &str) -> FsResult<()> {
    let metadata = fs::symlink_metadata(path)
        .await
        .map_err(|e| FsError::io(display, e))?;
    let result = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    result.map_err(|e| FsError::io(display, e))
}
