//! FileInfo construction from filesystem metadata

use std::fs::Metadata;
use std::path::Path;

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::types::{FileInfo, FsError, FsResult};

/// Stat `path` (following symlinks) and describe it
///
/// `display_path` is what ends up in `FileInfo::path`.
pub async fn file_info(path: &Path, display_path: &str) -> FsResult<FileInfo> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| FsError::io(display_path, e))?;

    Ok(from_metadata(path, display_path, &metadata))
}

pub fn from_metadata(path: &Path, display_path: &str, metadata: &Metadata) -> FileInfo {
    let created: Option<DateTime<Utc>> = metadata.created().ok().map(|t| t.into());
    let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(|t| t.into());

    FileInfo {
        path: display_path.to_string(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| display_path.to_string()),
        size: metadata.len(),
        is_directory: metadata.is_dir(),
        created,
        modified,
        permissions: permissions_string(metadata),
    }
}

#[cfg(unix)]
fn permissions_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    filemode(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn permissions_string(metadata: &Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let write = if metadata.permissions().readonly() { '-' } else { 'w' };
    format!("{}r{}-r{}-r{}-", kind, write, write, write)
}

/// Render mode bits the way `ls -l` does, e.g. `-rw-r--r--`
pub fn filemode(mode: u32) -> String {
    const S_IFMT: u32 = 0o170000;

    let kind = match mode & S_IFMT {
        0o040000 => 'd',
        0o120000 => 'l',
        0o020000 => 'c',
        0o060000 => 'b',
        0o010000 => 'p',
        0o140000 => 's',
        _ => '-',
    };

    let mut out = String::with_capacity(10);
    out.push(kind);

    // (read bit, write bit, exec bit, special bit, special char)
    let triads = [
        (0o400, 0o200, 0o100, 0o4000, 's'),
        (0o040, 0o020, 0o010, 0o2000, 's'),
        (0o004, 0o002, 0o001, 0o1000, 't'),
    ];

    for (r, w, x, special, special_char) in triads {
        out.push(if mode & r != 0 { 'r' } else { '-' });
        out.push(if mode & w != 0 { 'w' } else { '-' });
        out.push(match (mode & x != 0, mode & special != 0) {
            (true, true) => special_char,
            (false, true) => special_char.to_ascii_uppercase(),
            (true, false) => 'x',
            (false, false) => '-',
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filemode_regular_and_dir() {
        assert_eq!(filemode(0o100644), "-rw-r--r--");
        assert_eq!(filemode(0o040755), "drwxr-xr-x");
        assert_eq!(filemode(0o120777), "lrwxrwxrwx");
    }

    #[test]
    fn test_filemode_special_bits() {
        assert_eq!(filemode(0o104755), "-rwsr-xr-x");
        assert_eq!(filemode(0o041777), "drwxrwxrwt");
        assert_eq!(filemode(0o041776), "drwxrwxrwT");
    }

    #[tokio::test]
    async fn test_file_info_reads_stat() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "hello").unwrap();

        let info = file_info(&file, "note.txt").await.unwrap();
        assert_eq!(info.name, "note.txt");
        assert_eq!(info.path, "note.txt");
        assert_eq!(info.size, 5);
        assert!(!info.is_directory);
        assert!(info.modified.is_some());
        assert!(info.permissions.starts_with('-'));

        let info = file_info(dir.path(), "dir").await.unwrap();
        assert!(info.is_directory);
        assert!(info.permissions.starts_with('d'));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = file_info(&dir.path().join("nope"), "nope").await.unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
    }
}
