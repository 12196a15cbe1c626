//! Sandbox module for path validation and security
//!
//! Every filesystem call goes through [`Sandbox::validate`] first. The only
//! way to obtain a [`ValidatedPath`] is through [`validate_path`], and
//! callers use it immediately instead of caching it, so a symlink swapped
//! between two calls is re-checked on the next one.

use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::types::{FsError, FsResult};

/// Absolute path proven to lie inside one of the allowed roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath(PathBuf);

impl ValidatedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ValidatedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Resolve `requested` and accept it only inside `roots`
///
/// Relative paths resolve against the working directory. `.` and `..` are
/// collapsed, then symlinks in the longest existing prefix are resolved, so
/// paths to files that do not exist yet still validate. Dangling symlinks
/// are followed to their target, which must lie inside the roots as well.
pub fn validate_path(requested: &str, roots: &[PathBuf]) -> FsResult<ValidatedPath> {
    let absolute = checked_absolute(requested)?;
    let resolved = resolve_existing_prefix(&absolute)?;
    contain(resolved, requested, roots)
}

/// Like [`validate_path`], but the final component is left unresolved
///
/// The parent directory is resolved and contained; the last name is joined
/// back as given. Operations that act on a directory entry itself (delete,
/// rename) use this so a symlink is removed or moved rather than its target.
pub fn validate_entry(requested: &str, roots: &[PathBuf]) -> FsResult<ValidatedPath> {
    let absolute = checked_absolute(requested)?;

    let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return validate_path(requested, roots);
    };

    let entry = resolve_existing_prefix(parent)?.join(name);
    contain(entry, requested, roots)
}

fn checked_absolute(requested: &str) -> FsResult<PathBuf> {
    if requested.is_empty() {
        return Err(FsError::EmptyPath);
    }

    if requested.contains('\0') {
        return Err(FsError::InvalidPath("Path contains null byte".to_string()));
    }

    absolutize(Path::new(requested))
}

fn contain(resolved: PathBuf, requested: &str, roots: &[PathBuf]) -> FsResult<ValidatedPath> {
    let claimed = roots
        .iter()
        .find(|root| resolved == **root || resolved.starts_with(root));

    match claimed {
        Some(root) => {
            tracing::trace!("{} claimed by root {}", resolved.display(), root.display());
            Ok(ValidatedPath(resolved))
        }
        None => {
            tracing::warn!("Sandbox violation: {} (requested {:?})", resolved.display(), requested);
            Err(FsError::PathNotAllowed {
                path: resolved,
                roots: roots.to_vec(),
            })
        }
    }
}

/// Make `path` absolute against the working directory and collapse `.`/`..`
pub fn absolutize(path: &Path) -> FsResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| FsError::InvalidPath(format!("{}: {}", path.display(), e)))?
            .join(path)
    };
    Ok(normalize(&joined))
}

/// Collapse `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Symlink hops followed before giving up, as ELOOP does
const MAX_SYMLINK_HOPS: usize = 40;

/// Canonicalize the longest existing ancestor and re-append the rest
fn resolve_existing_prefix(path: &Path) -> FsResult<PathBuf> {
    resolve_within(path, path, MAX_SYMLINK_HOPS)
}

fn resolve_within(original: &Path, path: &Path, hops_left: usize) -> FsResult<PathBuf> {
    let mut existing = path.to_path_buf();
    // trailing components that do not exist yet, innermost first
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(resolved) => return Ok(append_missing(resolved, &missing)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(target) = dangling_link_target(&existing)? {
                    if hops_left == 0 {
                        return Err(FsError::InvalidPath(format!(
                            "{}: too many levels of symbolic links",
                            original.display()
                        )));
                    }
                    let redirected = append_raw(target, &missing);
                    return resolve_within(original, &redirected, hops_left - 1);
                }

                let last = match existing.components().next_back() {
                    Some(Component::Normal(name)) => name.to_os_string(),
                    Some(Component::ParentDir) => OsString::from(".."),
                    Some(Component::CurDir) => OsString::from("."),
                    _ => return Ok(append_missing(existing, &missing)),
                };
                missing.push(last);
                existing.pop();
            }
            Err(e) => {
                return Err(FsError::InvalidPath(format!("{}: {}", original.display(), e)));
            }
        }
    }
}

/// Target of `path` when it is a symlink whose target does not exist
///
/// Relative targets are joined onto the link's resolved parent directory.
fn dangling_link_target(path: &Path) -> FsResult<Option<PathBuf>> {
    let is_link = std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return Ok(None);
    }

    let target = std::fs::read_link(path)
        .map_err(|e| FsError::InvalidPath(format!("{}: {}", path.display(), e)))?;
    if target.is_absolute() {
        return Ok(Some(target));
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("/"));
    let parent = parent
        .canonicalize()
        .map_err(|e| FsError::InvalidPath(format!("{}: {}", parent.display(), e)))?;
    Ok(Some(parent.join(target)))
}

/// Re-append missing components, collapsing `..` against what is already there
fn append_missing(mut base: PathBuf, missing: &[OsString]) -> PathBuf {
    for part in missing.iter().rev() {
        match part.to_str() {
            Some("..") => {
                base.pop();
            }
            Some(".") => {}
            _ => base.push(part),
        }
    }
    base
}

fn append_raw(mut base: PathBuf, missing: &[OsString]) -> PathBuf {
    for part in missing.iter().rev() {
        base.push(part);
    }
    base
}

/// Allowed roots plus the validation entry point
#[derive(Debug, Clone)]
pub struct Sandbox {
    roots: Vec<PathBuf>,
}

impl Sandbox {
    /// Build a sandbox from configured root directories
    ///
    /// Each root must exist and be a directory. Roots are canonicalized so
    /// containment checks compare resolved paths on both sides; duplicates
    /// are dropped, order is kept.
    pub fn new<P: AsRef<Path>>(roots: &[P]) -> FsResult<Self> {
        if roots.is_empty() {
            return Err(FsError::ConfigError(
                "at least one allowed directory is required".to_string(),
            ));
        }

        let mut resolved: Vec<PathBuf> = Vec::with_capacity(roots.len());
        for root in roots {
            let root = root.as_ref();
            let canonical = absolutize(root)?.canonicalize().map_err(|e| {
                FsError::ConfigError(format!("allowed directory {}: {}", root.display(), e))
            })?;
            if !canonical.is_dir() {
                return Err(FsError::ConfigError(format!(
                    "allowed directory {} is not a directory",
                    root.display()
                )));
            }
            if !resolved.contains(&canonical) {
                resolved.push(canonical);
            }
        }

        tracing::info!(
            "Sandbox roots: {}",
            resolved
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { roots: resolved })
    }

    pub fn validate(&self, requested: &str) -> FsResult<ValidatedPath> {
        validate_path(requested, &self.roots)
    }

    /// Validate a directory entry without following a final symlink
    pub fn validate_entry(&self, requested: &str) -> FsResult<ValidatedPath> {
        validate_entry(requested, &self.roots)
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
